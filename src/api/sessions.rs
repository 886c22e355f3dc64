use serde::de::IgnoredAny;
use tracing::info;

use super::{ApiClient, ApiRequest};
use crate::{
    cache::QueryKey,
    error::ClientError,
    models::{NewSession, Session},
};

impl ApiClient {
    /// Сеансы фильма. Отсутствие сеансов (404) даёт пустой список.
    pub async fn sessions_for_movie(&self, movie_id: i64) -> Result<Vec<Session>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Sessions(movie_id), || async move {
                let sessions = self
                    .transport
                    .fetch::<Vec<Session>>(
                        ApiRequest::get(format!("/sessions/movie/{}", movie_id)),
                        None,
                    )
                    .await?;
                Ok(sessions.unwrap_or_default())
            })
            .await
    }

    pub async fn create_session(&self, session: &NewSession) -> Result<Option<Session>, ClientError> {
        self.require_admin()?;
        let created = self
            .auth
            .fetch_with_auth::<Session>(ApiRequest::post("/sessions").json(session)?)
            .await?;
        self.cache.invalidate(&QueryKey::Sessions(session.movie_id)).await;
        info!("Session created for movie {}", session.movie_id);
        Ok(created)
    }

    pub async fn delete_session(&self, movie_id: i64, session_id: i64) -> Result<(), ClientError> {
        self.require_admin()?;
        self.auth
            .fetch_with_auth::<IgnoredAny>(ApiRequest::delete(format!("/sessions/{}", session_id)))
            .await?;
        self.cache.invalidate(&QueryKey::Sessions(movie_id)).await;
        self.cache.invalidate(&QueryKey::Seats(session_id)).await;
        info!("Session {} deleted", session_id);
        Ok(())
    }
}
