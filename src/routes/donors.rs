use axum::{
    extract::{Query, State},
    response::Response,
};
use chrono::Utc;

use super::{baseline_key, csv_attachment, list_response, unavailable};
use crate::error::AppError;
use crate::export;
use crate::session::Session;
use crate::views::{DonorFilters, DonorView, PageFilters};
use crate::AppState;

const DONORS_FAILED: &str = "Failed to load donors";

pub async fn list_donors(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<DonorFilters>,
) -> Response {
    let baseline = state
        .baselines
        .donors
        .get_or_load(&baseline_key("donors", &session), filters.refresh(), DONORS_FAILED, || {
            state.backend.list_donors(&session)
        })
        .await;

    let now = Utc::now();
    let data: Vec<DonorView> = filters
        .criteria(now)
        .apply(&baseline.items)
        .into_iter()
        .map(|d| DonorView::new(d, now))
        .collect();
    list_response(&baseline, data, baseline.stats.clone())
}

/// Exports the currently filtered donors, not the whole baseline.
pub async fn export_donors(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<DonorFilters>,
) -> Result<Response, AppError> {
    let baseline = state
        .baselines
        .donors
        .get_or_load(&baseline_key("donors", &session), filters.refresh(), DONORS_FAILED, || {
            state.backend.list_donors(&session)
        })
        .await;
    if let Some(message) = &baseline.error {
        return Ok(unavailable(message));
    }

    let now = Utc::now();
    let donors = filters.criteria(now).apply(&baseline.items);
    let body = export::donors_csv(&donors, now)?;
    tracing::info!("Exported {} donors", donors.len());
    Ok(csv_attachment(body, "donors.csv"))
}
