use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{acknowledged, baseline_key, csv_attachment, list_response, unavailable};
use crate::backend::{ContactSubmission, MessageUpdate};
use crate::error::AppError;
use crate::export;
use crate::session::Session;
use crate::validation;
use crate::views::{MessageFilters, MessageSummary, MessageView, PageFilters};
use crate::AppState;

const SUBMIT_FAILED: &str = "Failed to send message";
const MESSAGES_FAILED: &str = "Failed to load messages";
const UPDATE_FAILED: &str = "Failed to update message";
const NOTE_FAILED: &str = "Failed to add note";
const RESPONSE_FAILED: &str = "Failed to send response";
const DELETE_FAILED: &str = "Failed to delete message";

const INBOX_SCOPE: &str = "messages";

pub async fn submit_message(
    State(state): State<AppState>,
    session: Session,
    Json(submission): Json<ContactSubmission>,
) -> Result<Json<Value>, AppError> {
    validation::contact_submission(&submission)?;
    let ack = state
        .backend
        .submit_contact(&session, &submission)
        .await
        .map_err(|e| e.for_action(SUBMIT_FAILED))?;
    tracing::info!("Contact message submitted: {:?}", submission.subject);
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Thank you for your message. We will get back to you soon."))
}

#[derive(Deserialize, Debug)]
pub struct MineParams {
    pub email: String,
}

/// Messages previously sent from one email address, newest state from the backend.
pub async fn my_messages(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<MineParams>,
) -> Result<Json<Value>, AppError> {
    if !validation::is_valid_email(&params.email) {
        return Err(AppError::validation("Please enter a valid email address"));
    }
    let page = state
        .backend
        .my_messages(&session, params.email.trim())
        .await
        .map_err(|e| e.for_action(MESSAGES_FAILED))?;
    let data: Vec<MessageView> = page.items.iter().map(MessageView::from).collect();
    Ok(Json(json!({ "success": true, "count": data.len(), "data": data })))
}

pub async fn list_messages(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<MessageFilters>,
) -> Response {
    let baseline = state
        .baselines
        .messages
        .get_or_load(
            &baseline_key(INBOX_SCOPE, &session),
            filters.refresh(),
            MESSAGES_FAILED,
            || state.backend.list_messages(&session),
        )
        .await;

    let data: Vec<MessageView> = filters
        .criteria()
        .apply(&baseline.items)
        .into_iter()
        .map(MessageView::from)
        .collect();
    let stats = match &baseline.stats {
        Some(stats) => Some(stats.clone()),
        None if baseline.is_error() => None,
        None => serde_json::to_value(MessageSummary::of(&baseline.items)).ok(),
    };
    list_response(&baseline, data, stats)
}

pub async fn export_messages(
    State(state): State<AppState>,
    session: Session,
    Query(filters): Query<MessageFilters>,
) -> Result<Response, AppError> {
    let baseline = state
        .baselines
        .messages
        .get_or_load(
            &baseline_key(INBOX_SCOPE, &session),
            filters.refresh(),
            MESSAGES_FAILED,
            || state.backend.list_messages(&session),
        )
        .await;
    if let Some(message) = &baseline.error {
        return Ok(unavailable(message));
    }

    let messages = filters.criteria().apply(&baseline.items);
    let body = export::messages_csv(&messages)?;
    tracing::info!("Exported {} contact messages", messages.len());
    Ok(csv_attachment(body, "contact-messages.csv"))
}

pub async fn update_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(update): Json<MessageUpdate>,
) -> Result<Json<Value>, AppError> {
    if update == MessageUpdate::default() {
        return Err(AppError::validation("Nothing to update"));
    }
    let ack = state
        .backend
        .update_message(&session, &id, &update)
        .await
        .map_err(|e| e.for_action(UPDATE_FAILED))?;
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Message updated"))
}

pub async fn mark_read(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ack = state
        .backend
        .mark_message_read(&session, &id)
        .await
        .map_err(|e| e.for_action(UPDATE_FAILED))?;
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Message marked as read"))
}

#[derive(Deserialize, Debug)]
pub struct NoteRequest {
    #[serde(default)]
    pub note: String,
}

pub async fn add_note(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<NoteRequest>,
) -> Result<Json<Value>, AppError> {
    validation::non_empty("Note", &request.note)?;
    let ack = state
        .backend
        .add_message_note(&session, &id, request.note.trim())
        .await
        .map_err(|e| e.for_action(NOTE_FAILED))?;
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Note added"))
}

#[derive(Deserialize, Debug)]
pub struct ResponseRequest {
    #[serde(default)]
    pub message: String,
}

pub async fn respond(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<ResponseRequest>,
) -> Result<Json<Value>, AppError> {
    validation::non_empty("Response", &request.message)?;
    let ack = state
        .backend
        .respond_to_message(&session, &id, request.message.trim())
        .await
        .map_err(|e| e.for_action(RESPONSE_FAILED))?;
    tracing::info!("Responded to contact message {}", id);
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Response sent"))
}

pub async fn delete_message(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let ack = state
        .backend
        .delete_message(&session, &id)
        .await
        .map_err(|e| e.for_action(DELETE_FAILED))?;
    state.baselines.messages.invalidate_all().await;
    Ok(acknowledged(ack, "Message deleted"))
}
