use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{segment, Ack, BackendClient, ListPage};
use crate::error::AppError;
use crate::models::{ContactMessage, ContactStatus, Priority};
use crate::session::Session;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

/// Admin update of a message's workflow fields. Only set fields are sent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContactStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BackendClient {
    pub async fn submit_contact(&self, session: &Session, submission: &ContactSubmission) -> Result<Ack, AppError> {
        let builder = self
            .request(Method::POST, "/contact/submit", session)?
            .json(submission);
        self.acknowledge(builder).await
    }

    pub async fn list_messages(&self, session: &Session) -> Result<ListPage<ContactMessage>, AppError> {
        session.require()?;
        self.fetch_list("/contact/messages", session).await
    }

    pub async fn update_message(&self, session: &Session, id: &str, update: &MessageUpdate) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self
            .request(Method::PUT, &format!("/contact/messages/{}", segment(id)?), session)?
            .json(update);
        self.acknowledge(builder).await
    }

    pub async fn mark_message_read(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::PUT, &format!("/contact/messages/{}/read", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn add_message_note(&self, session: &Session, id: &str, note: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self
            .request(Method::POST, &format!("/contact/messages/{}/notes", segment(id)?), session)?
            .json(&json!({ "note": note }));
        self.acknowledge(builder).await
    }

    pub async fn respond_to_message(&self, session: &Session, id: &str, response: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self
            .request(Method::POST, &format!("/contact/messages/{}/response", segment(id)?), session)?
            .json(&json!({ "message": response }));
        self.acknowledge(builder).await
    }

    pub async fn delete_message(&self, session: &Session, id: &str) -> Result<Ack, AppError> {
        session.require()?;
        let builder = self.request(Method::DELETE, &format!("/contact/messages/{}", segment(id)?), session)?;
        self.acknowledge(builder).await
    }

    pub async fn my_messages(&self, session: &Session, email: &str) -> Result<ListPage<ContactMessage>, AppError> {
        self.fetch_list(&format!("/contact/my-messages/{}", segment(email)?), session)
            .await
    }
}
