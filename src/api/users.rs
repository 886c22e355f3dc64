use serde::de::IgnoredAny;
use tracing::info;

use super::{http::path_segment, ApiClient, ApiRequest};
use crate::{
    error::ClientError,
    models::{Credentials, NewUser, User},
};

impl ApiClient {
    /// Выдача токена по email и паролю. Сам вход выполняет `login`.
    pub async fn issue_token(&self, credentials: &Credentials) -> Result<String, ClientError> {
        let request = ApiRequest::post("/authentication/token").json(credentials)?;
        match self.transport.fetch::<String>(request, None).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(ClientError::NotFound("account".to_string())),
            // Неверный пароль сервер тоже отдаёт как 401
            Err(ClientError::Unauthorized) => Err(ClientError::Status {
                status: 401,
                message: "invalid email or password".to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Получить токен и войти.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ClientError> {
        let token = self.issue_token(credentials).await?;
        self.auth.login(&token).await
    }

    pub fn logout(&self) {
        self.auth.logout();
    }

    pub async fn register(&self, user: &NewUser) -> Result<(), ClientError> {
        self.transport
            .fetch::<IgnoredAny>(ApiRequest::post("/authentication/user").json(user)?, None)
            .await?;
        info!("Registered {}", user.email);
        Ok(())
    }

    /// Активация аккаунта по токену из письма.
    pub async fn activate(&self, token: &str) -> Result<(), ClientError> {
        let path = format!("/users/activate/{}", path_segment(token)?);
        self.transport
            .fetch::<IgnoredAny>(ApiRequest::put(path), None)
            .await?;
        info!("Account activated");
        Ok(())
    }

    pub async fn me(&self) -> Result<Option<User>, ClientError> {
        self.auth.fetch_with_auth::<User>(ApiRequest::get("/users/me")).await
    }
}
