use serde::de::IgnoredAny;
use tracing::info;

use super::{ApiClient, ApiRequest};
use crate::{
    cache::QueryKey,
    error::ClientError,
    models::{Ticket, TicketUpdate},
};

impl ApiClient {
    /// Билеты текущего пользователя. Не кешируются: список личный.
    pub async fn my_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let tickets = self
            .auth
            .fetch_with_auth::<Vec<Ticket>>(ApiRequest::get("/tickets/my"))
            .await?;
        Ok(tickets.unwrap_or_default())
    }

    pub async fn ticket_for_seat(
        &self,
        session_id: i64,
        seat_id: i64,
    ) -> Result<Option<Ticket>, ClientError> {
        self.auth
            .fetch_with_auth::<Ticket>(ApiRequest::get(format!(
                "/tickets/session/{}/seat/{}",
                session_id, seat_id
            )))
            .await
    }

    /// Обновление цены и статуса. Карта мест сеанса сбрасывается, чтобы
    /// статус места совпадал с последним состоянием билета.
    pub async fn update_ticket(
        &self,
        ticket_id: i64,
        session_id: i64,
        update: &TicketUpdate,
    ) -> Result<(), ClientError> {
        self.auth
            .fetch_with_auth::<IgnoredAny>(
                ApiRequest::patch(format!("/tickets/{}", ticket_id)).json(update)?,
            )
            .await?;
        self.cache.invalidate(&QueryKey::Seats(session_id)).await;
        info!("Ticket {} updated to {}", ticket_id, update.status);
        Ok(())
    }

    /// Удаление билета освобождает место.
    pub async fn delete_ticket(&self, ticket_id: i64, session_id: i64) -> Result<(), ClientError> {
        self.auth
            .fetch_with_auth::<IgnoredAny>(ApiRequest::delete(format!("/tickets/{}", ticket_id)))
            .await?;
        self.cache.invalidate(&QueryKey::Seats(session_id)).await;
        info!("Ticket {} deleted", ticket_id);
        Ok(())
    }
}
