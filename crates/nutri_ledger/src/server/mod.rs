use std::net::SocketAddr;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::{dispatch::Dispatcher, error::IngressError, state::AppContext, telegram::Update};

#[derive(Clone)]
pub struct ServerState {
    ctx: AppContext,
    dispatcher: Dispatcher,
}

impl ServerState {
    pub fn new(ctx: AppContext) -> Self {
        let dispatcher = Dispatcher::new(&ctx);
        Self { ctx, dispatcher }
    }

    fn ctx(&self) -> &AppContext {
        &self.ctx
    }
}

pub async fn serve(state: ServerState) -> anyhow::Result<()> {
    let addr: SocketAddr = state.ctx().config().server.addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    serve_with_listener(listener, state).await
}

pub async fn serve_with_listener(listener: TcpListener, state: ServerState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "server listening");

    let app = router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.ctx().clone()))
        .await?;

    Ok(())
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/:secret", post(telegram_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal(ctx: AppContext) {
    ctx.shutdown_notifier().notified().await;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub ok: bool,
}

/// The secret is checked before the body is looked at, so a rejected call
/// never reaches the dispatcher.
async fn telegram_webhook(
    State(state): State<ServerState>,
    Path(secret): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookResponse>, IngressError> {
    if secret != state.ctx().config().telegram.webhook_secret {
        warn!("webhook called with wrong secret");
        return Err(IngressError::Forbidden);
    }

    let update: Update = serde_json::from_slice(&body).inspect_err(|err| {
        warn!(error = %err, "failed to decode telegram update");
    })?;

    let span = info_span!(
        "delivery",
        delivery_id = %Uuid::new_v4(),
        update_id = update.update_id
    );
    state
        .dispatcher
        .dispatch(&update)
        .instrument(span)
        .await
        .map_err(|err| {
            warn!(error = ?err, update_id = update.update_id, "failed to handle update");
            IngressError::Delivery(err)
        })?;

    Ok(Json(WebhookResponse { ok: true }))
}
