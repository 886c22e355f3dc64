//! Проверка оплаты после возврата со страницы платёжного провайдера.

use tracing::{info, warn};

use crate::{api::ApiClient, notify::Toasts};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentResult {
    Success,
    Failed,
}

/// Номер заказа из адреса возврата (`.../purchase/complete/{order}`) или сам номер.
pub fn order_id_from_return_url(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let path = raw.split(['?', '#']).next().unwrap_or(raw);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
}

/// Успехом считается только `result == "ok"`. Любой другой ответ, пустой
/// ответ или ошибка означают неудачу.
pub async fn complete_purchase(api: &ApiClient, toasts: &Toasts, order_id: &str) -> PaymentResult {
    match api.payment_status(order_id).await {
        Ok(Some(check)) if check.is_ok() => {
            info!("Payment for order {} confirmed", order_id);
            toasts.success("Thank you for your purchase! The ticket is in My tickets.");
            PaymentResult::Success
        }
        Ok(check) => {
            warn!("Payment for order {} not confirmed: {:?}", order_id, check);
            toasts.error("Payment failed. Try again or contact support.");
            PaymentResult::Failed
        }
        Err(e) => {
            warn!("Payment status check for order {} failed: {}", order_id, e);
            toasts.error("Payment failed. Try again or contact support.");
            PaymentResult::Failed
        }
    }
}
