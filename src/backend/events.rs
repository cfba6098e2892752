use chrono::{DateTime, Utc};
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{segment, Ack, BackendClient, ListPage};
use crate::error::AppError;
use crate::models::{datetime, Event};
use crate::session::Session;

/// Non-file attributes of an event; sent as the JSON `eventData` field of the multipart form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "datetime::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(deserialize_with = "datetime::deserialize")]
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub max_capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EventImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl BackendClient {
    pub async fn list_events(&self, session: &Session) -> Result<ListPage<Event>, AppError> {
        self.fetch_list("/events", session).await
    }

    pub async fn get_event(&self, session: &Session, id: &str) -> Result<Event, AppError> {
        self.fetch_one(&format!("/events/{}", segment(id)?), session).await
    }

    pub async fn create_event(
        &self,
        session: &Session,
        draft: &EventDraft,
        image: Option<EventImage>,
    ) -> Result<Ack, AppError> {
        session.require()?;
        let form = event_form(draft, image)?;
        let builder = self.request(Method::POST, "/events", session)?.multipart(form);
        self.acknowledge(builder).await
    }

    pub async fn update_event(
        &self,
        session: &Session,
        id: &str,
        draft: &EventDraft,
        image: Option<EventImage>,
    ) -> Result<Ack, AppError> {
        session.require()?;
        let form = event_form(draft, image)?;
        let builder = self
            .request(Method::PUT, &format!("/events/{}", segment(id)?), session)?
            .multipart(form);
        self.acknowledge(builder).await
    }

    pub async fn delete_event(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::DELETE, &format!("/events/{}", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn register_for_event(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::POST, &format!("/events/{}/register", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn unregister_from_event(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::POST, &format!("/events/{}/unregister", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn event_registrations(&self, session: &Session, id: &str) -> Result<Value, AppError> {
        session.require()?;
        self.fetch_one(&format!("/events/{}/registrations", segment(id)?), session)
            .await
    }

    pub async fn my_registrations(&self, session: &Session) -> Result<ListPage<Event>, AppError> {
        session.require()?;
        self.fetch_list("/events/my-registrations/list", session).await
    }

    pub async fn my_events(&self, session: &Session) -> Result<ListPage<Event>, AppError> {
        session.require()?;
        self.fetch_list("/events/my-events/list", session).await
    }

    pub async fn admin_all_events(&self, session: &Session) -> Result<ListPage<Event>, AppError> {
        session.require()?;
        self.fetch_list("/events/admin/all-events", session).await
    }

    pub async fn approve_event(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::PUT, &format!("/events/{}/approve", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn reject_event(&self, session: &Session, id: &str, reason: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self
            .request(Method::PUT, &format!("/events/{}/reject", segment(id)?), session)?
            .json(&json!({ "reason": reason }));
        self.acknowledge(builder).await
    }
}

fn event_form(draft: &EventDraft, image: Option<EventImage>) -> Result<Form, AppError> {
    let event_data = serde_json::to_string(draft)
        .map_err(|e| AppError::validation(format!("Event details could not be encoded: {e}")))?;
    let form = Form::new().text("eventData", event_data);
    let Some(image) = image else {
        return Ok(form);
    };
    let part = Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.content_type)
        .map_err(|_| AppError::validation(format!("Unsupported image type {}", image.content_type)))?;
    Ok(form.part("image", part))
}
