pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod notify;
pub mod services;
pub mod storage;
pub mod views;

use std::sync::Arc;
use tracing::info;

use crate::{
    api::ApiClient,
    error::ClientError,
    notify::Toasts,
    storage::{ClientStorage, FileStorage},
};

// Общий контекст клиента: конфигурация, API и очередь уведомлений
#[derive(Clone, Debug)]
pub struct AppContext {
    pub config: config::Config,
    pub api: ApiClient,
    pub toasts: Toasts,
}

impl AppContext {
    /// Собирает контекст с файловым хранилищем из конфигурации.
    pub fn new(config: config::Config) -> Result<Self, ClientError> {
        let storage = FileStorage::open(&config.storage.path);
        info!("Client storage at {}", storage.path().display());
        Self::with_storage(config, Arc::new(storage))
    }

    pub fn with_storage(
        config: config::Config,
        storage: Arc<dyn ClientStorage>,
    ) -> Result<Self, ClientError> {
        let api = ApiClient::from_config(&config, storage)?;
        Ok(Self {
            config,
            api,
            toasts: Toasts::new(),
        })
    }

    /// Шаг запуска: проверить сохранённую сессию.
    pub async fn start(&self) -> Result<(), ClientError> {
        match self.api.auth().restore().await? {
            Some(user) => info!("Restored session for {}", user.username),
            None => info!("Starting without a session"),
        }
        Ok(())
    }

    pub fn account(&self) -> services::account::AccountService {
        services::account::AccountService::new(self.api.clone(), self.toasts.clone())
    }

    #[cfg(feature = "admin")]
    pub fn admin(&self) -> services::admin::AdminService {
        services::admin::AdminService::new(self.api.clone(), self.toasts.clone())
    }

    pub fn movie_page(&self, slug: &str) -> services::booking::MovieDetailPage {
        services::booking::MovieDetailPage::new(self.api.clone(), self.toasts.clone(), slug)
    }

    pub fn ticket_editor(&self, session_id: i64, seat_id: i64) -> services::ticket_edit::TicketEditor {
        services::ticket_edit::TicketEditor::open(
            self.api.clone(),
            self.toasts.clone(),
            session_id,
            seat_id,
        )
    }
}
