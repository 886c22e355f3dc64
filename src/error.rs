use reqwest::StatusCode;
use thiserror::Error;

/// Ошибки клиентской библиотеки.
///
/// Таксономия повторяет то, как интерфейс реагирует на сбои: ошибки валидации
/// показываются у формы, 401 приводит к выходу из аккаунта, 404 на чтении
/// превращается в `None` ещё на уровне транспорта, всё остальное уходит в
/// уведомления.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Форма не прошла проверку, запрос не отправлялся.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Авторизованный вызов без токена, запрос не отправлялся.
    #[error("user is not authenticated")]
    NotAuthenticated,

    /// Сервер ответил 401, сессия сброшена.
    #[error("unauthorized, session has been cleared")]
    Unauthorized,

    /// Действие доступно только администратору.
    #[error("admin role required")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid token: {0}")]
    Token(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("invalid request path segment: {0}")]
    InvalidPath(String),

    #[error("cannot apply {event} in state {state}")]
    InvalidTransition { state: String, event: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        ClientError::Status {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    /// Сообщение, которое можно показать пользователю как есть.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(messages) => messages.join("\n"),
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for ClientError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        ClientError::Token(e.to_string())
    }
}
