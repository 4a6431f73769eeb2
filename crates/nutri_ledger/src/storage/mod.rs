use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::StorageConfig;

/// Result of one persistence attempt. Always returned as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageOutcome {
    pub success: bool,
    pub status_code: Option<u16>,
    pub response_body: Value,
}

impl StorageOutcome {
    pub fn failed(status_code: Option<u16>, response_body: Value) -> Self {
        Self {
            success: false,
            status_code,
            response_body,
        }
    }
}

impl fmt::Display for StorageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "status {status}: {}", self.response_body),
            None => write!(f, "{}", self.response_body),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend not configured")]
    NotConfigured,
    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("record serialization failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("storage rejected insert with status {status}")]
    Rejected { status: u16, body: Value },
}

impl From<StorageError> for StorageOutcome {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Rejected { status, body } => Self::failed(Some(status), body),
            other => Self::failed(None, json!({ "error": other.to_string() })),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, collection: &str, row: &Value) -> StorageOutcome;
}

/// Serialize a record and hand it to the store.
pub async fn insert_record<T: Serialize + Sync>(
    store: &dyn RecordStore,
    collection: &str,
    record: &T,
) -> StorageOutcome {
    match serde_json::to_value(record) {
        Ok(row) => store.insert(collection, &row).await,
        Err(err) => StorageError::from(err).into(),
    }
}

/// PostgREST-style insert over HTTP, one attempt per call.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: Client,
    endpoint: Option<Endpoint>,
}

#[derive(Debug, Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        let endpoint = match (&config.url, &config.key) {
            (Some(url), Some(key)) => Some(Endpoint {
                base_url: url.trim_end_matches('/').to_string(),
                api_key: key.clone(),
            }),
            _ => None,
        };
        Ok(Self { http, endpoint })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn try_insert(&self, collection: &str, row: &Value) -> Result<StorageOutcome, StorageError> {
        let endpoint = self.endpoint.as_ref().ok_or(StorageError::NotConfigured)?;
        let url = format!("{}/rest/v1/{}", endpoint.base_url, collection);

        let response = self
            .http
            .post(url)
            .header("apikey", &endpoint.api_key)
            .bearer_auth(&endpoint.api_key)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text)
            .unwrap_or_else(|_| json!({ "status": status.as_u16(), "text": text }));

        if matches!(status, StatusCode::OK | StatusCode::CREATED) {
            Ok(StorageOutcome {
                success: true,
                status_code: Some(status.as_u16()),
                response_body: body,
            })
        } else {
            Err(StorageError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl RecordStore for SupabaseStore {
    async fn insert(&self, collection: &str, row: &Value) -> StorageOutcome {
        match self.try_insert(collection, row).await {
            Ok(outcome) => {
                debug!(collection, status = ?outcome.status_code, "record stored");
                outcome
            }
            Err(err) => {
                warn!(collection, error = %err, "storage insert failed");
                err.into()
            }
        }
    }
}
