use super::{ApiClient, ApiRequest};
use crate::{cache::QueryKey, error::ClientError, models::Seat};

impl ApiClient {
    /// Карта мест сеанса. Кешируется по id сеанса.
    pub async fn seats_for_session(&self, session_id: i64) -> Result<Vec<Seat>, ClientError> {
        self.cache
            .get_or_fetch(QueryKey::Seats(session_id), || async move {
                let seats = self
                    .transport
                    .fetch::<Vec<Seat>>(
                        ApiRequest::get(format!("/seats/session/{}", session_id)),
                        None,
                    )
                    .await?;
                Ok(seats.unwrap_or_default())
            })
            .await
    }

    /// Сбросить карту мест, чтобы следующий запрос ушёл на сервер.
    pub async fn refresh_seats(&self, session_id: i64) -> Result<Vec<Seat>, ClientError> {
        self.cache.invalidate(&QueryKey::Seats(session_id)).await;
        self.seats_for_session(session_id).await
    }
}
