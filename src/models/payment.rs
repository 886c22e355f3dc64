use serde::{Deserialize, Serialize};

/// Запрос на создание платежа за одно место.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub session_id: i64,
    pub seat_id: i64,
}

/// Ответ на создание платежа: ссылка на страницу платёжного провайдера.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentLink {
    pub order_id: i64,
    #[serde(default)]
    pub status: String,
    pub url: String,
}

/// Результат проверки платежа по номеру заказа.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentCheck {
    #[serde(default)]
    pub result: Option<String>,
}

impl PaymentCheck {
    pub fn is_ok(&self) -> bool {
        self.result.as_deref() == Some("ok")
    }
}
