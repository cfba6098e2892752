//! Form checks that run before any network call. A failure here never reaches
//! the backend.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::backend::{ContactSubmission, EventDraft};
use crate::error::AppError;
use crate::models::BloodRequest;

pub const MIN_MESSAGE_LEN: usize = 10;
pub const MAX_MESSAGE_LEN: usize = 2000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

pub fn event_draft(draft: &EventDraft) -> Result<(), AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::validation("Event title is required"));
    }
    if draft.location.trim().is_empty() {
        return Err(AppError::validation("Event location is required"));
    }
    if draft.end_date < draft.date {
        return Err(AppError::validation("End date cannot be before start date"));
    }
    if draft.max_capacity == 0 {
        return Err(AppError::validation("Capacity must be at least 1"));
    }
    Ok(())
}

pub fn contact_submission(submission: &ContactSubmission) -> Result<(), AppError> {
    if submission.first_name.trim().is_empty() {
        return Err(AppError::validation("First name is required"));
    }
    if !is_valid_email(&submission.email) {
        return Err(AppError::validation("Please enter a valid email address"));
    }
    if submission.subject.trim().is_empty() {
        return Err(AppError::validation("Subject is required"));
    }
    let len = submission.message.trim().chars().count();
    if len < MIN_MESSAGE_LEN {
        return Err(AppError::validation(format!(
            "Message must be at least {MIN_MESSAGE_LEN} characters long"
        )));
    }
    if len > MAX_MESSAGE_LEN {
        return Err(AppError::validation(format!(
            "Message must be at most {MAX_MESSAGE_LEN} characters long"
        )));
    }
    Ok(())
}

pub fn blood_request(request: &BloodRequest, now: DateTime<Utc>) -> Result<(), AppError> {
    if request.units_needed == 0 {
        return Err(AppError::validation("At least one unit must be requested"));
    }
    if request.patient_name.trim().is_empty() {
        return Err(AppError::validation("Patient name is required"));
    }
    if request.hospital_name.trim().is_empty() {
        return Err(AppError::validation("Hospital name is required"));
    }
    if request.needed_by <= now {
        return Err(AppError::validation("Needed-by date must be in the future"));
    }
    Ok(())
}

pub fn rejection_reason(reason: &str) -> Result<(), AppError> {
    if reason.trim().is_empty() {
        return Err(AppError::validation("A rejection reason is required"));
    }
    Ok(())
}

pub fn non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
