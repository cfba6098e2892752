use serde::Deserialize;
use serde_json::Value;

/// Every backend response: `success`, an optional `data` payload, `message` on error,
/// and summary counts on some list endpoints.
#[derive(Deserialize, Debug)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub stats: Option<Value>,
}
