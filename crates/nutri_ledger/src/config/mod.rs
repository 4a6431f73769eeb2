use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, fmt};

const CONFIG_FILE: &str = "config/bot.yml";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "default_webhook_secret")]
    pub webhook_secret: String,
    #[serde(default)]
    pub webapp_url: Option<String>,
    /// Username without `@`; commands addressed to another bot are ignored.
    #[serde(default)]
    pub bot_username: Option<String>,
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

/// Connection settings for the REST storage backend.
///
/// Both `url` and `key` are optional: a missing value leaves the backend
/// unconfigured and every insert reports a failed outcome without touching
/// the network.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    telegram: Option<TelegramConfig>,
    #[serde(default)]
    storage: Option<StorageConfig>,
    #[serde(default)]
    server: Option<ServerConfig>,
}

impl AppConfig {
    /// Load `config/bot.yml` under `NUTRI_APP_ROOT` (when present) and apply
    /// environment overrides on top of it.
    pub fn load() -> anyhow::Result<Self> {
        let root = match env::var("NUTRI_APP_ROOT") {
            Ok(path) => PathBuf::from(path),
            Err(_) => env::current_dir()?,
        };
        let file = load_file_config(&root.join(CONFIG_FILE))?;
        Ok(Self::from_parts(file, |key| env::var(key).ok()))
    }

    fn from_parts(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value_of = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut telegram = file.telegram.unwrap_or_default();
        if let Some(token) = value_of("BOT_TOKEN") {
            telegram.bot_token = token;
        }
        if let Some(secret) = value_of("WEBHOOK_SECRET") {
            telegram.webhook_secret = secret;
        }
        if let Some(url) = value_of("WEBAPP_URL") {
            telegram.webapp_url = Some(url);
        }
        if let Some(username) = value_of("BOT_USERNAME") {
            telegram.bot_username = Some(username);
        }
        if let Some(base) = value_of("TELEGRAM_API_BASE") {
            telegram.api_base = base;
        }
        telegram.webapp_url = telegram.webapp_url.filter(|url| !url.trim().is_empty());

        let mut storage = file.storage.unwrap_or_default();
        if let Some(url) = value_of("SUPABASE_URL") {
            storage.url = Some(url);
        }
        if let Some(key) = value_of("SUPABASE_KEY") {
            storage.key = Some(key);
        }
        storage.url = storage.url.filter(|url| !url.trim().is_empty());
        storage.key = storage.key.filter(|key| !key.trim().is_empty());

        let mut server = file.server.unwrap_or_default();
        if let Some(bind) = value_of("NUTRI_SERVER_BIND") {
            server.bind_addr = bind;
        }

        Self {
            telegram,
            storage,
            server,
        }
    }
}

fn load_file_config(path: &Path) -> anyhow::Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path).with_context(|| format!("reading yaml {:?}", path))?;
    let parsed =
        serde_yaml::from_str(&content).with_context(|| format!("parsing yaml {:?}", path))?;
    Ok(parsed)
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            webhook_secret: default_webhook_secret(),
            webapp_url: None,
            bot_username: None,
            api_base: default_telegram_api_base(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

impl StorageConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    pub fn addr(&self) -> &str {
        &self.bind_addr
    }
}

fn default_webhook_secret() -> String {
    "secret".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_storage_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
