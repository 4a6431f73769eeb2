use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use crate::{
    forms::FormIntake,
    replies,
    router::IntentRouter,
    state::AppContext,
    telegram::{ChatTransport, InlineKeyboardMarkup, Message, OutboundMessage, Update},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    App,
    Product,
    Day,
}

impl Command {
    /// Parse a leading `/command` with optional trailing arguments.
    ///
    /// An `@mention` suffix must name this bot (case-insensitively) when the
    /// bot's username is known. Unknown commands are not commands.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let token = token.strip_prefix('/')?;
        let (name, mention) = match token.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (token, None),
        };
        if let (Some(mention), Some(own)) = (mention, bot_username) {
            if !mention.eq_ignore_ascii_case(own.trim_start_matches('@')) {
                return None;
            }
        }
        match name {
            "start" | "help" => Some(Self::Start),
            "app" => Some(Self::App),
            "product" => Some(Self::Product),
            "day" => Some(Self::Day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    Form(String),
    Text(String),
    Ignore,
}

impl Route {
    pub fn of(message: &Message, bot_username: Option<&str>) -> Self {
        if let Some(text) = message.text.as_deref() {
            if let Some(command) = Command::parse(text, bot_username) {
                return Route::Command(command);
            }
        }
        if let Some(data) = &message.web_app_data {
            return Route::Form(data.data.clone());
        }
        match &message.text {
            Some(text) => Route::Text(text.clone()),
            None => Route::Ignore,
        }
    }
}

/// Routes each decoded update to exactly one handler and sends its replies.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn ChatTransport>,
    router: IntentRouter,
    forms: FormIntake,
    webapp_url: String,
    bot_username: Option<String>,
}

impl Dispatcher {
    pub fn new(ctx: &AppContext) -> Self {
        let config = ctx.config();
        let webapp_url = config
            .telegram
            .webapp_url
            .clone()
            .unwrap_or_else(|| replies::APP_FALLBACK_URL.to_string());
        Self {
            transport: ctx.transport(),
            router: IntentRouter::new(ctx.store()),
            forms: FormIntake::new(ctx.store()),
            webapp_url,
            bot_username: config.telegram.bot_username.clone(),
        }
    }

    pub async fn dispatch(&self, update: &Update) -> anyhow::Result<()> {
        let Some(message) = update.primary_message() else {
            debug!(update_id = update.update_id, "update carries no message");
            return Ok(());
        };

        let chat_id = message.chat.id;
        let user_id = message.sender_id();
        let route = Route::of(message, self.bot_username.as_deref());

        match route {
            Route::Command(command) => {
                info!(update_id = update.update_id, ?command, "handling command");
                self.run_command(command, chat_id).await
            }
            Route::Form(data) => {
                let reply = self.forms.handle(&user_id, &data).await;
                self.send(OutboundMessage::text(chat_id, reply)).await
            }
            Route::Text(text) => {
                let reply = self.router.handle_text(&user_id, &text).await;
                self.send(OutboundMessage::text(chat_id, reply)).await
            }
            Route::Ignore => {
                debug!(update_id = update.update_id, "message has no text or form data");
                Ok(())
            }
        }
    }

    async fn run_command(&self, command: Command, chat_id: i64) -> anyhow::Result<()> {
        match command {
            Command::Start => {
                self.send(OutboundMessage::text(chat_id, replies::GREETING).markdown())
                    .await?;
                self.send(self.app_launcher(chat_id)).await
            }
            Command::App => self.send(self.app_launcher(chat_id)).await,
            Command::Product => {
                self.send(OutboundMessage::text(chat_id, replies::PRODUCT_TEMPLATE).markdown())
                    .await
            }
            Command::Day => {
                self.send(OutboundMessage::text(chat_id, replies::DAY_SUMMARY))
                    .await
            }
        }
    }

    fn app_launcher(&self, chat_id: i64) -> OutboundMessage {
        OutboundMessage::text(chat_id, replies::APP_PROMPT).with_keyboard(
            InlineKeyboardMarkup::web_app_button(replies::APP_BUTTON, self.webapp_url.clone()),
        )
    }

    async fn send(&self, message: OutboundMessage) -> anyhow::Result<()> {
        self.transport
            .send_message(&message)
            .await
            .with_context(|| format!("sending reply to chat {}", message.chat_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::{Chat, WebAppData};

    fn message(text: Option<&str>, form: Option<&str>) -> Message {
        Message {
            message_id: 1,
            date: 0,
            chat: Chat { id: 10 },
            from: None,
            text: text.map(str::to_string),
            web_app_data: form.map(|data| WebAppData {
                data: data.to_string(),
                button_text: None,
            }),
        }
    }

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/start", None), Some(Command::Start));
        assert_eq!(Command::parse("/help", None), Some(Command::Start));
        assert_eq!(Command::parse("/app@nutri_bot", None), Some(Command::App));
        assert_eq!(Command::parse("/product please", None), Some(Command::Product));
        assert_eq!(Command::parse("/day", None), Some(Command::Day));
        assert_eq!(Command::parse("/unknown", None), None);
        assert_eq!(Command::parse("кофе 4800", None), None);
        assert_eq!(Command::parse("/Start", None), None);
    }

    #[test]
    fn mentions_must_name_this_bot() {
        let own = Some("nutri_bot");
        assert_eq!(Command::parse("/start@nutri_bot", own), Some(Command::Start));
        assert_eq!(Command::parse("/start@Nutri_Bot", own), Some(Command::Start));
        assert_eq!(Command::parse("/day", own), Some(Command::Day));
        assert_eq!(Command::parse("/start@other_bot", own), None);
        assert_eq!(
            Route::of(&message(Some("/app@other_bot"), None), own),
            Route::Text("/app@other_bot".to_string())
        );
    }

    #[test]
    fn routes_by_message_shape() {
        assert_eq!(
            Route::of(&message(Some("/day"), None), None),
            Route::Command(Command::Day)
        );
        assert_eq!(
            Route::of(&message(None, Some("{}")), None),
            Route::Form("{}".to_string())
        );
        assert_eq!(
            Route::of(&message(Some("/unknown"), None), None),
            Route::Text("/unknown".to_string())
        );
        assert_eq!(Route::of(&message(None, None), None), Route::Ignore);
    }
}
