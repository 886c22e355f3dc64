use tracing::info;

use super::{http::path_segment, ApiClient, ApiRequest};
use crate::{
    error::ClientError,
    models::{PaymentCheck, PaymentLink, PaymentRequest},
};

impl ApiClient {
    /// Создаёт билет и платёж, возвращает ссылку на оплату.
    pub async fn create_payment(&self, session_id: i64, seat_id: i64) -> Result<PaymentLink, ClientError> {
        let request = ApiRequest::post("/payments/create").json(&PaymentRequest { session_id, seat_id })?;
        let link = self
            .auth
            .fetch_with_auth::<PaymentLink>(request)
            .await?
            .ok_or_else(|| ClientError::NotFound(format!("session {} or seat {}", session_id, seat_id)))?;
        info!("Payment order {} created for seat {} in session {}", link.order_id, seat_id, session_id);
        Ok(link)
    }

    /// Проверка результата оплаты после возврата с платёжной страницы.
    pub async fn payment_status(&self, order_id: &str) -> Result<Option<PaymentCheck>, ClientError> {
        let path = format!("/payments/status/{}", path_segment(order_id)?);
        self.transport
            .fetch::<PaymentCheck>(ApiRequest::put(path), None)
            .await
    }
}
