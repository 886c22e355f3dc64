//! Контекст авторизации.
//!
//! `AuthSession` создаётся один раз при старте и передаётся всем, кому нужен
//! текущий пользователь или авторизованные запросы. Токен и пользователь
//! хранятся в памяти и дублируются в `ClientStorage`, чтобы пережить
//! перезапуск. Любое изменение публикуется через `watch`-канал.

pub mod claims;

use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    api::http::{ApiRequest, HttpTransport},
    error::ClientError,
    models::User,
    storage::{ClientStorage, TOKEN_KEY, USER_KEY},
};

pub use claims::{decode_claims, TokenClaims};

#[derive(Debug, Clone, Default)]
struct AuthState {
    token: Option<String>,
    user: Option<User>,
}

pub struct AuthSession {
    transport: HttpTransport,
    storage: Arc<dyn ClientStorage>,
    state: RwLock<AuthState>,
    changes: watch::Sender<Option<User>>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthSession {
    /// Поднимает состояние из хранилища без сетевых запросов.
    /// Для проверки сохранённого токена вызовите `restore`.
    pub fn new(transport: HttpTransport, storage: Arc<dyn ClientStorage>) -> Self {
        let token = storage.get(TOKEN_KEY);
        let user = storage
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());
        let (changes, _) = watch::channel(user.clone());
        Self {
            transport,
            storage,
            state: RwLock::new(AuthState { token, user }),
            changes,
        }
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn current_user(&self) -> Option<User> {
        self.read_state().user
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(|u| u.is_admin())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().token.is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read_state().token
    }

    /// Подписка на смену пользователя (вход, выход, обновление профиля).
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.changes.subscribe()
    }

    /// Проверка сохранённой сессии при старте приложения.
    ///
    /// Просроченный или нечитаемый токен, как и отказ `/users/me`, приводят
    /// к выходу из аккаунта.
    pub async fn restore(&self) -> Result<Option<User>, ClientError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        match decode_claims(&token) {
            Ok(claims) if !claims.is_expired() => {}
            Ok(_) => {
                warn!("Stored token has expired, logging out");
                self.logout();
                return Ok(None);
            }
            Err(e) => {
                warn!("Stored token is unreadable, logging out: {}", e);
                self.logout();
                return Ok(None);
            }
        }

        match self.verify(&token).await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Failed to verify stored user, logging out: {}", e);
                self.logout();
                Ok(None)
            }
        }
    }

    /// Вход по выданному сервером токену.
    pub async fn login(&self, token: &str) -> Result<User, ClientError> {
        let claims = decode_claims(token)?;
        if claims.is_expired() {
            return Err(ClientError::Token("token has already expired".to_string()));
        }

        // Любой сбой откатывает вход целиком
        let result = match self.storage.set(TOKEN_KEY, token) {
            Ok(()) => {
                self.write_state().token = Some(token.to_string());
                self.verify(token).await
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => {
                info!("Logged in as {} (admin: {})", user.username, user.is_admin());
                Ok(user)
            }
            Err(e) => {
                warn!("Login failed, rolling back: {}", e);
                self.logout();
                Err(e)
            }
        }
    }

    /// Сбрасывает токен и пользователя в памяти и в хранилище.
    pub fn logout(&self) {
        {
            let mut state = self.write_state();
            state.token = None;
            state.user = None;
        }
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!("Failed to remove {} from storage: {}", key, e);
            }
        }
        self.changes.send_replace(None);
        info!("Logged out");
    }

    /// Авторизованный запрос.
    ///
    /// Без токена запрос не отправляется. 401 завершает сессию, 404 и 204
    /// дают `Ok(None)`, прочие неуспешные коды возвращаются как ошибка.
    pub async fn fetch_with_auth<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Option<T>, ClientError> {
        let Some(token) = self.token() else {
            debug!("Rejecting {} {} without token", request.method, request.path);
            return Err(ClientError::NotAuthenticated);
        };

        match self.transport.fetch(request, Some(&token)).await {
            Err(ClientError::Unauthorized) => {
                warn!("Server rejected the token, logging out");
                self.logout();
                Err(ClientError::Unauthorized)
            }
            other => other,
        }
    }

    /// Загружает пользователя по токену и сохраняет его.
    async fn verify(&self, token: &str) -> Result<User, ClientError> {
        let user = self.fetch_me(token).await?;
        self.set_user(user.clone())?;
        Ok(user)
    }

    async fn fetch_me(&self, token: &str) -> Result<User, ClientError> {
        self.transport
            .fetch::<User>(ApiRequest::get("/users/me"), Some(token))
            .await?
            .ok_or_else(|| ClientError::NotFound("current user".to_string()))
    }

    fn set_user(&self, user: User) -> Result<(), ClientError> {
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.write_state().user = Some(user.clone());
        self.changes.send_replace(Some(user));
        Ok(())
    }

    fn read_state(&self) -> AuthState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, AuthState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn session_with(storage: Arc<MemoryStorage>) -> AuthSession {
        let transport = HttpTransport::with_client("http://127.0.0.1:9", reqwest::Client::new());
        AuthSession::new(transport, storage)
    }

    #[test]
    fn picks_up_persisted_state() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tkn").unwrap();
        storage
            .set(
                USER_KEY,
                r#"{"id":1,"username":"a","email":"a@b.c","role":{"id":1,"name":"admin"}}"#,
            )
            .unwrap();

        let session = session_with(storage);
        assert!(session.is_authenticated());
        assert!(session.is_admin());
        assert_eq!(session.subscribe().borrow().as_ref().map(|u| u.id), Some(1));
    }

    #[test]
    fn logout_clears_memory_storage_and_notifies() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "tkn").unwrap();
        let session = session_with(storage.clone());
        let mut rx = session.subscribe();

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
        assert!(storage.get(TOKEN_KEY).is_none());
        assert!(storage.get(USER_KEY).is_none());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn fetch_without_token_is_rejected_locally() {
        let session = session_with(Arc::new(MemoryStorage::new()));
        let err = session
            .fetch_with_auth::<User>(ApiRequest::get("/users/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn expired_stored_token_is_dropped_on_restore() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(TOKEN_KEY, &claims::tests::token_with_exp(1_000))
            .unwrap();
        let session = session_with(storage.clone());

        let restored = session.restore().await.unwrap();
        assert!(restored.is_none());
        assert!(storage.get(TOKEN_KEY).is_none());
    }

    /// Хранилище, которое не принимает запись.
    struct FullDisk;

    impl ClientStorage for FullDisk {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), ClientError> {
            Err(ClientError::Storage("disk full".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_token_write_leaves_no_session() {
        let transport = HttpTransport::with_client("http://127.0.0.1:9", reqwest::Client::new());
        let session = AuthSession::new(transport, Arc::new(FullDisk));
        let mut rx = session.subscribe();

        let token = claims::tests::token_with_exp(chrono::Utc::now().timestamp() + 3600);
        let err = session.login(&token).await.unwrap_err();

        assert!(matches!(err, ClientError::Storage(_)));
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(session.current_user().is_none());
        assert!(rx.borrow_and_update().is_none());
        let err = session
            .fetch_with_auth::<User>(ApiRequest::get("/users/me"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn expired_token_cannot_log_in() {
        let session = session_with(Arc::new(MemoryStorage::new()));
        let err = session
            .login(&claims::tests::token_with_exp(1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Token(_)));
        assert!(!session.is_authenticated());
    }
}
