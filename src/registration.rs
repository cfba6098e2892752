//! Event registration toggle.
//!
//! Per (user, event) the state is either registered or not. Each toggle makes
//! exactly one backend call and the state only flips once that call reports
//! success; on failure the state is left as it was and the server's message
//! (or a generic one) is surfaced.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::backend::{Ack, BackendClient};
use crate::error::AppError;
use crate::models::{Event, EventStatus, RegistrationStatus};
use crate::session::Session;
use crate::status::{capacity, display_status, DisplayStatus};

pub const REGISTER_FAILED: &str = "Failed to register for event";
pub const UNREGISTER_FAILED: &str = "Failed to unregister from event";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationState {
    NotRegistered,
    Registered,
}

impl RegistrationState {
    /// Derives the caller's state from the event's registration list.
    pub fn of(event: &Event, user_id: Option<&str>) -> Self {
        let Some(user_id) = user_id else {
            return RegistrationState::NotRegistered;
        };
        let registered = event
            .registrations
            .iter()
            .any(|r| r.user_id.id() == user_id && r.status != RegistrationStatus::Cancelled);
        if registered {
            RegistrationState::Registered
        } else {
            RegistrationState::NotRegistered
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            RegistrationState::NotRegistered => RegistrationState::Registered,
            RegistrationState::Registered => RegistrationState::NotRegistered,
        }
    }

    pub fn is_registered(self) -> bool {
        matches!(self, RegistrationState::Registered)
    }
}

/// Whether a new registration may be offered for the event right now.
pub fn registration_open(event: &Event, now: DateTime<Utc>) -> bool {
    event.status == EventStatus::Approved
        && !capacity(event.registered_count, event.max_capacity).is_full()
        && display_status(now, event.date, event.ends_at()) != DisplayStatus::Completed
}

/// The two backend calls the toggle drives.
pub trait RegistrationGateway {
    fn register(&self, session: &Session, event_id: &str) -> impl std::future::Future<Output = Result<Ack, AppError>> + Send;
    fn unregister(&self, session: &Session, event_id: &str) -> impl std::future::Future<Output = Result<Ack, AppError>> + Send;
}

impl RegistrationGateway for BackendClient {
    async fn register(&self, session: &Session, event_id: &str) -> Result<Ack, AppError> {
        self.register_for_event(session, event_id).await
    }

    async fn unregister(&self, session: &Session, event_id: &str) -> Result<Ack, AppError> {
        self.unregister_from_event(session, event_id).await
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub state: RegistrationState,
    pub message: Option<String>,
}

pub async fn toggle<G: RegistrationGateway>(
    gateway: &G,
    session: &Session,
    event_id: &str,
    current: RegistrationState,
) -> Result<ToggleOutcome, AppError> {
    let (result, fallback) = match current {
        RegistrationState::NotRegistered => (gateway.register(session, event_id).await, REGISTER_FAILED),
        RegistrationState::Registered => (gateway.unregister(session, event_id).await, UNREGISTER_FAILED),
    };

    match result {
        Ok(ack) => {
            tracing::info!("Registration for event {} is now {:?}", event_id, current.flipped());
            Ok(ToggleOutcome {
                state: current.flipped(),
                message: ack.message,
            })
        }
        Err(e) => {
            tracing::warn!("Registration toggle for event {} failed: {}", event_id, e);
            Err(e.for_action(fallback))
        }
    }
}
