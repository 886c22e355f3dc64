//! Слой доступа к API: по одному методу `ApiClient` на каждый вызов,
//! который делает интерфейс. Методы разнесены по файлам ресурсов.

pub mod http;
pub mod movies;
pub mod payments;
pub mod rooms;
pub mod seats;
pub mod sessions;
pub mod tickets;
pub mod users;

use std::sync::Arc;

use crate::{
    auth::AuthSession,
    cache::QueryCache,
    config::Config,
    error::ClientError,
    storage::ClientStorage,
};

pub use http::{ApiRequest, FormField, HttpTransport, RequestBody};

#[derive(Clone, Debug)]
pub struct ApiClient {
    transport: HttpTransport,
    auth: Arc<AuthSession>,
    cache: QueryCache,
}

impl ApiClient {
    pub fn new(transport: HttpTransport, auth: Arc<AuthSession>, cache: QueryCache) -> Self {
        Self {
            transport,
            auth,
            cache,
        }
    }

    /// Собирает клиент целиком из конфигурации и хранилища.
    pub fn from_config(config: &Config, storage: Arc<dyn ClientStorage>) -> Result<Self, ClientError> {
        let transport = HttpTransport::from_config(&config.api)?;
        let auth = Arc::new(AuthSession::new(transport.clone(), storage));
        let cache = QueryCache::from_config(&config.cache);
        Ok(Self::new(transport, auth, cache))
    }

    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Проверка прав администратора до отправки запроса.
    pub(crate) fn require_admin(&self) -> Result<(), ClientError> {
        if !self.auth.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        if !self.auth.is_admin() {
            return Err(ClientError::Forbidden);
        }
        Ok(())
    }
}
