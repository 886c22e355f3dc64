//! Регистрация, вход, активация и список билетов пользователя.
//!
//! Формы проверяются до запроса: при ошибке валидации сеть не трогаем.

use tracing::{info, warn};

use crate::{
    api::ApiClient,
    error::ClientError,
    forms::{LoginForm, RegisterForm},
    models::User,
    notify::Toasts,
    views::TicketRow,
};

pub struct AccountService {
    api: ApiClient,
    toasts: Toasts,
}

impl AccountService {
    pub fn new(api: ApiClient, toasts: Toasts) -> Self {
        Self { api, toasts }
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<(), ClientError> {
        form.check()?;
        match self.api.register(&form.to_new_user()).await {
            Ok(()) => {
                self.toasts
                    .info("Registration complete. Check your e-mail to activate the account.");
                Ok(())
            }
            Err(e) => {
                self.toasts.error(format!("Registration failed: {}", e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<User, ClientError> {
        form.check()?;
        match self.api.login(&form.credentials()).await {
            Ok(user) => {
                self.toasts.success(format!("Welcome, {}!", user.username));
                Ok(user)
            }
            Err(e) => {
                let message = match &e {
                    ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
                    _ => "Login failed, please try again".to_string(),
                };
                warn!("Login failed: {}", e);
                self.toasts.error(message);
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.api.logout();
        self.api.cache().clear();
        self.toasts.info("You have been logged out");
    }

    pub async fn activate(&self, token: &str) -> Result<(), ClientError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Validation(vec!["activation token is required".to_string()]));
        }
        match self.api.activate(token).await {
            Ok(()) => {
                self.toasts.success("Account activated, you can log in now");
                Ok(())
            }
            Err(e) => {
                self.toasts.error(format!("Activation failed: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// Билеты пользователя в виде строк таблицы, с QR для подтверждённых.
    pub async fn my_tickets(&self) -> Result<Vec<TicketRow>, ClientError> {
        let tickets = self.api.my_tickets().await?;
        info!("Loaded {} tickets", tickets.len());
        let base = self.api.transport().base_url();
        Ok(tickets.iter().map(|t| TicketRow::new(base, t)).collect())
    }
}
