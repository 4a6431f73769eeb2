use std::env;

use anyhow::{Context, Result};
use nutri_ledger::{config::AppConfig, telegram::BotApiClient};

#[tokio::main]
async fn main() -> Result<()> {
    nutri_ledger::config::init_tracing();
    let config = AppConfig::load()?;

    let public_url = match env::args().nth(1) {
        Some(url) => url,
        None => env::var("NUTRI_PUBLIC_URL").context("reading NUTRI_PUBLIC_URL")?,
    };
    let public_url = public_url.trim_end_matches('/');
    let hook_url = format!("{}/webhook/{}", public_url, config.telegram.webhook_secret);

    let client = BotApiClient::new(&config.telegram)?;
    client
        .set_webhook(&hook_url)
        .await
        .with_context(|| format!("registering webhook under {}", public_url))?;

    println!("Webhook registered under {public_url}/webhook/<secret>.");
    Ok(())
}
