use axum::{
    extract::{Query, State},
    response::{Json, Response},
};
use chrono::Utc;
use serde_json::Value;

use super::{acknowledged, baseline_key, list_response};
use crate::error::AppError;
use crate::models::BloodRequest;
use crate::session::Session;
use crate::validation;
use crate::views::{PageFilters, RequestFilters, RequestView};
use crate::AppState;

const REQUESTS_FAILED: &str = "Failed to load blood requests";
const CREATE_FAILED: &str = "Failed to submit blood request";

pub async fn list_requests(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<RequestFilters>,
) -> Response {
    let baseline = state
        .baselines
        .requests
        .get_or_load(
            &baseline_key("blood-requests", &session),
            filters.refresh(),
            REQUESTS_FAILED,
            || state.backend.list_blood_requests(&session),
        )
        .await;

    let now = Utc::now();
    let data: Vec<RequestView> = filters
        .criteria()
        .apply(&baseline.items)
        .into_iter()
        .map(|r| RequestView::new(r, now))
        .collect();
    list_response(&baseline, data, baseline.stats.clone())
}

pub async fn create_request(
    State(state): State<AppState>,
    session: Session,
    Json(mut request): Json<BloodRequest>,
) -> Result<Json<Value>, AppError> {
    session.require()?;
    validation::blood_request(&request, Utc::now())?;
    // The backend assigns both on creation.
    request.id = None;
    request.status = None;

    let ack = state
        .backend
        .create_blood_request(&session, &request)
        .await
        .map_err(|e| e.for_action(CREATE_FAILED))?;
    tracing::info!(
        "Blood request for {} units of {} ({}) submitted",
        request.units_needed,
        request.blood_type,
        request.urgency
    );
    state.baselines.requests.invalidate_all().await;
    Ok(acknowledged(ack, "Blood request submitted"))
}
