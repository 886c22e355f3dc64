use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Главная структура конфигурации - контейнер для всех настроек клиента
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub cache: CacheConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: String,
    pub rust_log: String,
}

// Настройки REST API кинотеатра
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

// Где храним токен и пользователя между запусками (аналог localStorage)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

// Настройки кеша результатов запросов
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub max_capacity: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Переменные окружения, которые перекрывают значения по умолчанию и файл.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("APP_NAME", "app.name"),
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.rust_log"),
    ("API_URL", "api.base_url"),
    ("API_TIMEOUT_SECONDS", "api.timeout_seconds"),
    ("STORAGE_PATH", "storage.path"),
    ("CACHE_TTL_SECONDS", "cache.ttl_seconds"),
    ("CACHE_MAX_CAPACITY", "cache.max_capacity"),
];

impl Config {
    /// Собирает конфигурацию: значения по умолчанию, затем необязательный
    /// файл (`CINEMA_CONFIG`, по умолчанию `cinema.toml`), затем окружение.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = env::var("CINEMA_CONFIG").unwrap_or_else(|_| "cinema".to_string());
        Self::load(Some(&file), |key| env::var(key).ok())
    }

    /// То же, что `from_env`, но с явным источником переменных (для тестов).
    pub fn load<F>(file: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .set_default("app.name", "Ticketo")?
            .set_default("app.environment", "development")?
            .set_default("app.rust_log", "cinema_client=info")?
            .set_default("api.base_url", "http://localhost:8080/v1")?
            .set_default("api.timeout_seconds", 30i64)?
            .set_default("storage.path", default_storage_path())?
            .set_default("cache.ttl_seconds", 300i64)?
            .set_default("cache.max_capacity", 1000i64)?;

        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, lookup(var))?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "API_URL must be an http(s) URL, got {}",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("API_TIMEOUT_SECONDS must be > 0".to_string()));
        }
        Ok(())
    }
}

fn default_storage_path() -> String {
    env::var("HOME")
        .map(|home| format!("{}/.cinema/storage.json", home))
        .unwrap_or_else(|_| ".cinema/storage.json".to_string())
}
