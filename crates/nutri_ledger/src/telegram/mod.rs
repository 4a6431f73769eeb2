use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::TelegramConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub channel_post: Option<Message>,
}

impl Update {
    pub fn primary_message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.channel_post.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub web_app_data: Option<WebAppData>,
}

impl Message {
    /// Identity records are attributed to. Channel posts carry no sender, so
    /// the chat id stands in.
    pub fn sender_id(&self) -> String {
        match &self.from {
            Some(user) => user.id.to_string(),
            None => self.chat.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebAppData {
    pub data: String,
    #[serde(default)]
    pub button_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_app: Option<WebAppInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebAppInfo {
    pub url: String,
}

impl InlineKeyboardMarkup {
    /// Single-button keyboard that opens the companion web app.
    pub fn web_app_button(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.into(),
                web_app: Some(WebAppInfo { url: url.into() }),
            }]],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl OutboundMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    pub fn markdown(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Markdown);
        self
    }

    pub fn with_keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(keyboard);
        self
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, message: &OutboundMessage) -> anyhow::Result<Option<i64>>;
}

#[derive(Debug, Clone)]
pub struct BotApiClient {
    http: Client,
    base_url: String,
}

impl BotApiClient {
    pub fn new(config: &TelegramConfig) -> anyhow::Result<Self> {
        let http = Client::builder().build()?;
        let base = config.api_base.trim_end_matches('/');
        Ok(Self {
            http,
            base_url: format!("{}/bot{}", base, config.bot_token),
        })
    }

    async fn call(&self, method: &str, body: &serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("calling telegram {method}"))?;

        if !response.status().is_success() {
            return Err(anyhow!("telegram {method} returned status {}", response.status()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("decoding telegram {method} response"))?;

        let ok = payload
            .get("ok")
            .and_then(|flag| flag.as_bool())
            .unwrap_or(false);
        if !ok {
            return Err(anyhow!("telegram {method} rejected: {}", payload));
        }
        Ok(payload)
    }

    /// Username of the bot behind the token, as reported by `getMe`.
    pub async fn get_me(&self) -> anyhow::Result<Option<String>> {
        let payload = self.call("getMe", &json!({})).await?;
        Ok(payload
            .get("result")
            .and_then(|value| value.get("username"))
            .and_then(|value| value.as_str())
            .map(str::to_string))
    }

    /// Point the bot's webhook at `url`.
    pub async fn set_webhook(&self, url: &str) -> anyhow::Result<()> {
        self.call("setWebhook", &json!({ "url": url })).await?;
        Ok(())
    }
}

#[async_trait]
impl ChatTransport for BotApiClient {
    async fn send_message(&self, message: &OutboundMessage) -> anyhow::Result<Option<i64>> {
        let body = serde_json::to_value(message).context("encoding telegram message")?;
        let payload = self.call("sendMessage", &body).await?;
        Ok(payload
            .get("result")
            .and_then(|value| value.get("message_id"))
            .and_then(|value| value.as_i64()))
    }
}
