//! Кеш результатов запросов.
//!
//! Чтения из API запоминаются по `QueryKey` на время TTL, мутации
//! инвалидируют затронутые ключи, и следующий запрос идёт на сервер.
//! Значения лежат в виде JSON, чтобы один кеш хранил разные типы.

pub mod keys;

use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{config::CacheConfig, error::ClientError};

pub use keys::QueryKey;

#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, Arc<String>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.entries.entry_count())
            .finish()
    }
}

impl QueryCache {
    pub fn from_config(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl())
            .build();
        Self { entries }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let raw = self.entries.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Dropping undecodable cache entry {}: {}", key, e);
                self.entries.invalidate(key).await;
                None
            }
        }
    }

    pub async fn put<T: Serialize>(&self, key: QueryKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.entries.insert(key, Arc::new(raw)).await,
            Err(e) => warn!("Failed to cache {}: {}", key, e),
        }
    }

    /// Отдаёт значение из кеша или выполняет `fetch` и запоминает результат.
    /// Ошибки не кешируются.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if let Some(value) = self.get::<T>(&key).await {
            debug!("Cache HIT {}", key);
            return Ok(value);
        }
        debug!("Cache MISS {}", key);
        let value = fetch().await?;
        self.put(key, &value).await;
        Ok(value)
    }

    pub async fn invalidate(&self, key: &QueryKey) {
        self.entries.invalidate(key).await;
        debug!("Invalidated {}", key);
    }

    // Все страницы списка фильмов сразу
    pub async fn invalidate_movie_lists(&self) {
        let stale: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.is_movie_list())
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in stale {
            self.entries.invalidate(&key).await;
        }
        debug!("Invalidated movie lists");
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> QueryCache {
        QueryCache::from_config(&CacheConfig {
            ttl_seconds: 60,
            max_capacity: 100,
        })
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let value: Vec<i64> = cache
                .get_or_fetch(QueryKey::Seats(1), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_refetch_and_keys_are_independent() {
        let cache = cache();
        cache.put(QueryKey::Seats(1), &vec![1]).await;
        cache.put(QueryKey::Seats(2), &vec![2]).await;

        cache.invalidate(&QueryKey::Seats(1)).await;

        assert_eq!(cache.get::<Vec<i64>>(&QueryKey::Seats(1)).await, None);
        assert_eq!(cache.get::<Vec<i64>>(&QueryKey::Seats(2)).await, Some(vec![2]));
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = cache();
        let first: Result<Vec<i64>, _> = cache
            .get_or_fetch(QueryKey::Rooms, || async { Err(ClientError::Unauthorized) })
            .await;
        assert!(first.is_err());
        let second: Vec<i64> = cache
            .get_or_fetch(QueryKey::Rooms, || async { Ok(vec![7]) })
            .await
            .unwrap();
        assert_eq!(second, vec![7]);
    }

    #[tokio::test]
    async fn movie_lists_are_dropped_together() {
        let cache = cache();
        cache.put(QueryKey::Movies("limit=20&offset=0".into()), &1).await;
        cache.put(QueryKey::Movies("limit=20&offset=20".into()), &2).await;
        cache.put(QueryKey::Movie("dune".into()), &3).await;

        cache.invalidate_movie_lists().await;

        assert_eq!(cache.get::<i32>(&QueryKey::Movies("limit=20&offset=0".into())).await, None);
        assert_eq!(cache.get::<i32>(&QueryKey::Movie("dune".into())).await, Some(3));
    }
}
