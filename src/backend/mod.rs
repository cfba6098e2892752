//! Typed client for the platform's REST backend.
//!
//! Every response is an [`ApiEnvelope`]. A non-2xx status or `success: false`
//! becomes [`AppError::Business`] carrying the server's message; transport
//! failures and undecodable bodies are kept apart so callers can fall back to
//! a generic message. Nothing is retried.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::parse_base_url;
use crate::error::AppError;
use crate::models::ApiEnvelope;
use crate::session::Session;

pub mod contact;
pub mod directory;
pub mod events;

pub use contact::{ContactSubmission, MessageUpdate};
pub use events::{EventDraft, EventImage};

const USER_AGENT: &str = concat!("BloodPortal/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

/// A list payload plus any summary counts the endpoint reported.
#[derive(Debug, Clone)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub stats: Option<Value>,
}

/// Result of a mutation call: the backend's confirmation message and any echoed record.
#[derive(Debug, Clone, Default)]
pub struct Ack {
    pub message: Option<String>,
    pub data: Option<Value>,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Config(format!("invalid endpoint path {path}: {e}")))
    }

    pub(crate) fn request(&self, method: Method, path: &str, session: &Session) -> Result<RequestBuilder, AppError> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        Ok(match session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<ApiEnvelope<T>, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(AppError::Decode(e.to_string())),
            Err(_) => {
                return Err(AppError::Business {
                    status,
                    message: error_message(&bytes),
                })
            }
        };

        if !status.is_success() || !envelope.success {
            return Err(AppError::Business {
                status: if status.is_success() { StatusCode::OK } else { status },
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    pub(crate) async fn fetch_list<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<ListPage<T>, AppError> {
        let envelope: ApiEnvelope<Vec<T>> = self.send(self.request(Method::GET, path, session)?).await?;
        Ok(ListPage {
            items: envelope.data.unwrap_or_default(),
            stats: envelope.stats,
        })
    }

    pub(crate) async fn fetch_one<T: DeserializeOwned>(&self, path: &str, session: &Session) -> Result<T, AppError> {
        let envelope: ApiEnvelope<T> = self.send(self.request(Method::GET, path, session)?).await?;
        envelope.data.ok_or(AppError::NotFound)
    }

    pub(crate) async fn acknowledge(&self, builder: RequestBuilder) -> Result<Ack, AppError> {
        let envelope: ApiEnvelope<Value> = self.send(builder).await?;
        Ok(Ack {
            message: envelope.message,
            data: envelope.data,
        })
    }
}

/// Best-effort `message` from an error body that is not a full envelope.
fn error_message(bytes: &[u8]) -> Option<String> {
    #[derive(Deserialize)]
    struct Partial {
        message: Option<String>,
        error: Option<String>,
    }
    let partial: Partial = serde_json::from_slice(bytes).ok()?;
    partial.message.or(partial.error)
}

/// Percent-encodes a single path segment such as an id or an email address.
///
/// Dot segments are refused: URL parsing resolves `.` and `..` (encoded or
/// not) against the base and the call would land on another endpoint.
pub(crate) fn segment(raw: &str) -> Result<String, AppError> {
    if matches!(raw, "" | "." | "..") {
        return Err(AppError::validation("Invalid identifier"));
    }
    Ok(url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20"))
}
