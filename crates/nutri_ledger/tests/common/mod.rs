use std::net::SocketAddr;

use anyhow::Result;
use nutri_ledger::{
    config::{AppConfig, ServerConfig, StorageConfig, TelegramConfig},
    server::{self, ServerState},
    state::AppContext,
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

pub const SECRET: &str = "e2e-secret";
pub const TOKEN: &str = "E2E_TOKEN";

/// Config that points both the Bot API and the storage backend at `mock_base`.
pub fn config_for(mock_base: &str, storage_configured: bool) -> AppConfig {
    AppConfig {
        telegram: TelegramConfig {
            bot_token: TOKEN.to_string(),
            webhook_secret: SECRET.to_string(),
            webapp_url: None,
            bot_username: Some("nutri_bot".to_string()),
            api_base: mock_base.to_string(),
        },
        storage: StorageConfig {
            url: storage_configured.then(|| mock_base.to_string()),
            key: storage_configured.then(|| "service-key".to_string()),
            timeout_secs: 2,
        },
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
        },
    }
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub ctx: AppContext,
    pub join: JoinHandle<()>,
}

impl RunningServer {
    pub fn webhook_url(&self, secret: &str) -> String {
        format!("http://{}/webhook/{}", self.addr, secret)
    }

    pub async fn stop(self) {
        self.ctx.request_shutdown();
        let _ = self.join.await;
    }
}

pub async fn start_server(config: AppConfig) -> Result<RunningServer> {
    let ctx = AppContext::from_app_config(config)?;
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::new(ctx.clone());
    let join = tokio::spawn(async move {
        let _ = server::serve_with_listener(listener, state).await;
    });
    Ok(RunningServer {
        addr,
        ctx,
        join,
    })
}

pub fn text_update(update_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private"},
            "from": {"id": 321, "is_bot": false, "first_name": "Test"},
            "text": text,
        }
    })
}

pub fn form_update(update_id: i64, data: &Value) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id * 10,
            "date": 1700000000,
            "chat": {"id": 555, "type": "private"},
            "from": {"id": 321, "is_bot": false, "first_name": "Test"},
            "web_app_data": {"data": data.to_string(), "button_text": "Сохранить"},
        }
    })
}
