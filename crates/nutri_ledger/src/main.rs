use nutri_ledger::{
    config,
    server::{self, ServerState},
    state::AppContext,
    telegram::BotApiClient,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing();
    let mut config = config::AppConfig::load()?;
    if config.telegram.bot_username.is_none() {
        match BotApiClient::new(&config.telegram)?.get_me().await {
            Ok(username) => {
                info!(username = ?username, "resolved bot username");
                config.telegram.bot_username = username;
            }
            Err(err) => warn!(error = %err, "could not resolve bot username; accepting any command mention"),
        }
    }
    if !config.storage.is_configured() {
        warn!("storage backend not configured; records will not be persisted");
    }
    let ctx = AppContext::from_app_config(config)?;

    let server_state = ServerState::new(ctx.clone());
    let server_task = tokio::spawn(async move {
        if let Err(err) = server::serve(server_state).await {
            error!(error = ?err, "server error");
        }
    });

    tokio::signal::ctrl_c().await?;
    ctx.request_shutdown();

    if let Err(err) = server_task.await {
        error!(error = ?err, "server task join error");
    }

    Ok(())
}
