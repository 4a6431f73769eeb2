use std::sync::Arc;

use tokio::sync::Notify;

use crate::{
    config::AppConfig,
    storage::{RecordStore, SupabaseStore},
    telegram::{BotApiClient, ChatTransport},
};

/// Process-scoped services, built once at startup and shared by reference
/// with every request.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<AppConfig>,
    shutdown: Arc<Notify>,
    store: Arc<dyn RecordStore>,
    transport: Arc<dyn ChatTransport>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            shutdown: Arc::new(Notify::new()),
            store,
            transport,
        }
    }

    /// Wire the HTTP-backed store and Bot API client from configuration.
    pub fn from_app_config(config: AppConfig) -> anyhow::Result<Self> {
        let store = SupabaseStore::new(&config.storage)?;
        let transport = BotApiClient::new(&config.telegram)?;
        Ok(Self::new(config, Arc::new(store), Arc::new(transport)))
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    pub fn transport(&self) -> Arc<dyn ChatTransport> {
        Arc::clone(&self.transport)
    }

    pub fn shutdown_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}
