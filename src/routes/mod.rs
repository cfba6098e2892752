//! JSON handlers for the portal pages.
//!
//! List handlers share one shape: load (or reuse) the caller's baseline, run
//! the page's filter set over it locally, project the matches into views.
//! Mutations validate first, make one backend call, then drop the affected
//! baselines so the next list read refetches.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::backend::Ack;
use crate::fetcher::Baseline;
use crate::session::Session;

pub mod blood_banks;
pub mod blood_requests;
pub mod contact;
pub mod donors;
pub mod events;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<V> {
    pub success: bool,
    pub data: Vec<V>,
    /// Matches after filtering.
    pub count: usize,
    /// Size of the unfiltered baseline.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// A failed baseline is reported as an empty list with its message and a 502.
pub fn list_response<T, V: Serialize>(baseline: &Baseline<T>, data: Vec<V>, stats: Option<Value>) -> Response {
    let status = if baseline.is_error() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    let body = ListResponse {
        success: !baseline.is_error(),
        count: data.len(),
        total: baseline.items.len(),
        data,
        stats,
        message: baseline.error.clone(),
        fetched_at: baseline.fetched_at,
    };
    (status, Json(body)).into_response()
}

/// Baselines are scoped per page variant and per caller.
pub fn baseline_key(scope: &str, session: &Session) -> String {
    format!("{scope}|{}", session.cache_key())
}

pub fn acknowledged(ack: Ack, default_message: &str) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": ack.message.unwrap_or_else(|| default_message.to_string()),
        "data": ack.data,
    }))
}

pub fn unavailable(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

pub fn csv_attachment(body: String, file_name: &'static str) -> Response {
    let mut resp = Response::new(body.into());
    let headers = resp.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8"));
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename={file_name}")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    resp
}
