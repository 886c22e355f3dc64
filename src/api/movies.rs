use serde::de::IgnoredAny;
use tracing::info;

use super::{http::path_segment, ApiClient, ApiRequest};
use crate::{
    cache::QueryKey,
    error::ClientError,
    forms::MovieForm,
    models::{Movie, MoviesQuery},
};

impl ApiClient {
    /// Список фильмов. 404 трактуется как пустой список.
    pub async fn list_movies(&self, query: &MoviesQuery) -> Result<Vec<Movie>, ClientError> {
        let qs = query
            .to_query_string()
            .map_err(|e| ClientError::Decode(format!("invalid movies query: {}", e)))?;
        let key = QueryKey::Movies(qs.clone());
        self.cache
            .get_or_fetch(key, || async move {
                let movies = self
                    .transport
                    .fetch::<Vec<Movie>>(ApiRequest::get(format!("/movies?{}", qs)), None)
                    .await?;
                Ok(movies.unwrap_or_default())
            })
            .await
    }

    /// Карточка фильма по slug. `None`, если фильма нет.
    pub async fn movie(&self, slug: &str) -> Result<Option<Movie>, ClientError> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Ok(None);
        }
        self.cache
            .get_or_fetch(QueryKey::Movie(slug.to_string()), || async move {
                let path = format!("/movies/{}", path_segment(slug)?);
                self.transport.fetch::<Movie>(ApiRequest::get(path), None).await
            })
            .await
    }

    pub async fn create_movie(&self, form: &MovieForm) -> Result<Option<Movie>, ClientError> {
        self.require_admin()?;
        let request = ApiRequest::post("/movies").multipart(form.to_multipart().await?);
        let created = self.auth.fetch_with_auth::<Movie>(request).await?;
        self.cache.invalidate(&QueryKey::Movie(form.slug.trim().to_string())).await;
        self.cache.invalidate_movie_lists().await;
        info!("Movie {} created", form.slug);
        Ok(created)
    }

    /// Обновление фильма. Постер отправляется, только если выбран новый файл.
    pub async fn update_movie(
        &self,
        movie: &Movie,
        form: &MovieForm,
    ) -> Result<(), ClientError> {
        self.require_admin()?;
        let request =
            ApiRequest::patch(format!("/movies/{}", movie.id)).multipart(form.to_multipart().await?);
        self.auth.fetch_with_auth::<IgnoredAny>(request).await?;

        self.cache.invalidate(&QueryKey::Movie(movie.slug.clone())).await;
        if form.slug.trim() != movie.slug {
            self.cache.invalidate(&QueryKey::Movie(form.slug.trim().to_string())).await;
        }
        self.cache.invalidate_movie_lists().await;
        info!("Movie {} updated", movie.id);
        Ok(())
    }

    pub async fn delete_movie(&self, movie: &Movie) -> Result<(), ClientError> {
        self.require_admin()?;
        self.auth
            .fetch_with_auth::<IgnoredAny>(ApiRequest::delete(format!("/movies/{}", movie.id)))
            .await?;
        self.cache.invalidate(&QueryKey::Movie(movie.slug.clone())).await;
        self.cache.invalidate(&QueryKey::Sessions(movie.id)).await;
        self.cache.invalidate_movie_lists().await;
        info!("Movie {} deleted", movie.id);
        Ok(())
    }
}
