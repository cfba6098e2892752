use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use serde_json::{json, Value};

use super::{baseline_key, list_response};
use crate::error::AppError;
use crate::session::Session;
use crate::views::{BloodBankFilters, BloodBankView, PageFilters, StockDetail};
use crate::AppState;

const BLOOD_BANKS_FAILED: &str = "Failed to load blood banks";
const STOCK_FAILED: &str = "Failed to load blood stock";

pub async fn list_blood_banks(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<BloodBankFilters>,
) -> Response {
    let baseline = state
        .baselines
        .blood_banks
        .get_or_load(
            &baseline_key("blood-banks", &session),
            filters.refresh(),
            BLOOD_BANKS_FAILED,
            || state.backend.list_blood_banks(&session),
        )
        .await;

    let data: Vec<BloodBankView> = filters
        .criteria()
        .apply(&baseline.items)
        .into_iter()
        .map(BloodBankView::from)
        .collect();
    list_response(&baseline, data, baseline.stats.clone())
}

/// Always read fresh: stock changes more often than the directory listing.
pub async fn blood_bank_stock(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let bank = state
        .backend
        .get_blood_bank(&session, &id)
        .await
        .map_err(|e| e.for_action(STOCK_FAILED))?;
    Ok(Json(json!({
        "success": true,
        "data": StockDetail::from(&bank),
    })))
}
