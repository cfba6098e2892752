use std::future::Future;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{acknowledged, baseline_key, list_response};
use crate::backend::{EventDraft, EventImage, ListPage};
use crate::error::AppError;
use crate::models::Event;
use crate::registration::{self, RegistrationState, REGISTER_FAILED};
use crate::session::Session;
use crate::validation;
use crate::views::{EventFilters, EventView, PageFilters};
use crate::AppState;

const EVENTS_FAILED: &str = "Failed to load events";
const EVENT_FAILED: &str = "Failed to load event";
const CREATE_FAILED: &str = "Failed to create event";
const UPDATE_FAILED: &str = "Failed to update event";
const DELETE_FAILED: &str = "Failed to delete event";
const APPROVE_FAILED: &str = "Failed to approve event";
const REJECT_FAILED: &str = "Failed to reject event";

async fn event_page<F, Fut>(
    state: &AppState,
    session: &Session,
    filters: &EventFilters,
    scope: &str,
    fetch: F,
) -> Response
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ListPage<Event>, AppError>>,
{
    let baseline = state
        .baselines
        .events
        .get_or_load(&baseline_key(scope, session), filters.refresh(), EVENTS_FAILED, fetch)
        .await;

    let now = Utc::now();
    let user_id = session.user_id();
    let data: Vec<EventView> = filters
        .criteria(now)
        .apply(&baseline.items)
        .into_iter()
        .map(|e| EventView::new(e, user_id.as_deref(), now))
        .collect();
    list_response(&baseline, data, baseline.stats.clone())
}

pub async fn list_events(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<EventFilters>,
) -> Response {
    event_page(&state, &session, &filters, "events", || state.backend.list_events(&session)).await
}

/// Events the caller organizes.
pub async fn my_events(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<EventFilters>,
) -> Response {
    event_page(&state, &session, &filters, "events-mine", || state.backend.my_events(&session)).await
}

/// Events the caller is registered for.
pub async fn registered_events(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<EventFilters>,
) -> Response {
    event_page(&state, &session, &filters, "events-registered", || {
        state.backend.my_registrations(&session)
    })
    .await
}

pub async fn admin_events(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<EventFilters>,
) -> Response {
    event_page(&state, &session, &filters, "events-admin", || {
        state.backend.admin_all_events(&session)
    })
    .await
}

pub async fn get_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let event = state
        .backend
        .get_event(&session, &id)
        .await
        .map_err(|e| e.for_action(EVENT_FAILED))?;
    let view = EventView::new(&event, session.user_id().as_deref(), Utc::now());
    Ok(Json(json!({ "success": true, "data": view })))
}

pub async fn event_registrations(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let registrations = state
        .backend
        .event_registrations(&session, &id)
        .await
        .map_err(|e| e.for_action(EVENT_FAILED))?;
    Ok(Json(json!({ "success": true, "data": registrations })))
}

/// Reads the `eventData` JSON field and the optional `image` file of an event form.
async fn read_event_form(mut multipart: Multipart) -> Result<(EventDraft, Option<EventImage>), AppError> {
    let mut draft = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "eventData" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid form data: {e}")))?;
                let parsed: EventDraft = serde_json::from_str(&text)
                    .map_err(|e| AppError::validation(format!("Invalid event details: {e}")))?;
                draft = Some(parsed);
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("event-image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid image upload: {e}")))?;
                if !bytes.is_empty() {
                    image = Some(EventImage {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            other => tracing::debug!("Ignoring unexpected form field {}", other),
        }
    }

    let draft = draft.ok_or_else(|| AppError::validation("Event details are required"))?;
    Ok((draft, image))
}

pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    session.require()?;
    let (draft, image) = read_event_form(multipart).await?;
    validation::event_draft(&draft)?;

    let ack = state
        .backend
        .create_event(&session, &draft, image)
        .await
        .map_err(|e| e.for_action(CREATE_FAILED))?;
    tracing::info!("Event {:?} submitted for approval", draft.title);
    state.baselines.events.invalidate_all().await;
    Ok(acknowledged(ack, "Event submitted for approval"))
}

pub async fn update_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    session.require()?;
    let (draft, image) = read_event_form(multipart).await?;
    validation::event_draft(&draft)?;

    let ack = state
        .backend
        .update_event(&session, &id, &draft, image)
        .await
        .map_err(|e| e.for_action(UPDATE_FAILED))?;
    state.baselines.events.invalidate_all().await;
    Ok(acknowledged(ack, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ack = state
        .backend
        .delete_event(&session, &id)
        .await
        .map_err(|e| e.for_action(DELETE_FAILED))?;
    state.baselines.events.invalidate_all().await;
    Ok(acknowledged(ack, "Event deleted"))
}

#[derive(Deserialize, Debug)]
pub struct ToggleRequest {
    /// The state the page currently shows. When omitted it is derived from the event.
    #[serde(default)]
    pub registered: Option<bool>,
}

pub async fn toggle_registration(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<Value>, AppError> {
    session.require()?;
    let current = match request.registered {
        Some(true) => RegistrationState::Registered,
        Some(false) => RegistrationState::NotRegistered,
        None => {
            let event = state
                .backend
                .get_event(&session, &id)
                .await
                .map_err(|e| e.for_action(REGISTER_FAILED))?;
            RegistrationState::of(&event, session.user_id().as_deref())
        }
    };

    let outcome = registration::toggle(&state.backend, &session, &id, current).await?;
    state.baselines.events.invalidate_all().await;
    Ok(Json(json!({
        "success": true,
        "message": outcome.message,
        "data": {
            "state": outcome.state,
            "registered": outcome.state.is_registered(),
        },
    })))
}

pub async fn approve_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ack = state
        .backend
        .approve_event(&session, &id)
        .await
        .map_err(|e| e.for_action(APPROVE_FAILED))?;
    tracing::info!("Event {} approved", id);
    state.baselines.events.invalidate_all().await;
    Ok(acknowledged(ack, "Event approved"))
}

#[derive(Deserialize, Debug)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: String,
}

pub async fn reject_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<Value>, AppError> {
    validation::rejection_reason(&request.reason)?;
    let ack = state
        .backend
        .reject_event(&session, &id, request.reason.trim())
        .await
        .map_err(|e| e.for_action(REJECT_FAILED))?;
    tracing::info!("Event {} rejected", id);
    state.baselines.events.invalidate_all().await;
    Ok(acknowledged(ack, "Event rejected"))
}
