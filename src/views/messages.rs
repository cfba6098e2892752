use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{wants_refresh, PageFilters};
use crate::filter::{active, parse_flag, Criteria, Searchable};
use crate::models::{ContactMessage, ContactStatus};
use crate::status::{contact_status_tone, priority_tone, BadgeTone};

impl Searchable for ContactMessage {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.subject.as_str()),
            Cow::Borrowed(self.message.as_str()),
            Cow::Borrowed(self.first_name.as_str()),
            Cow::Borrowed(self.last_name.as_str()),
            Cow::Borrowed(self.email.as_str()),
        ]
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageFilters {
    pub search: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub is_read: Option<String>,
    pub refresh: Option<String>,
}

/// `read`/`unread` as well as the usual boolean spellings.
fn read_flag(value: Option<&str>) -> Option<bool> {
    match active(value)?.to_ascii_lowercase().as_str() {
        "read" => Some(true),
        "unread" => Some(false),
        other => parse_flag(Some(other)),
    }
}

impl MessageFilters {
    pub fn criteria(&self) -> Criteria<'static, ContactMessage> {
        Criteria::new()
            .search(self.search.as_deref())
            .equals(self.status.as_deref(), |m: &ContactMessage| m.status)
            .equals(self.priority.as_deref(), |m: &ContactMessage| m.priority)
            .flag(read_flag(self.is_read.as_deref()), |m: &ContactMessage| m.is_read)
    }
}

impl PageFilters for MessageFilters {
    fn refresh(&self) -> bool {
        wants_refresh(self.refresh.as_deref())
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessageView<'a> {
    #[serde(flatten)]
    pub message: &'a ContactMessage,
    pub full_name: String,
    pub status_tone: BadgeTone,
    pub priority_tone: BadgeTone,
    pub note_count: usize,
    pub responded: bool,
}

impl<'a> From<&'a ContactMessage> for MessageView<'a> {
    fn from(message: &'a ContactMessage) -> Self {
        Self {
            full_name: message.full_name(),
            status_tone: contact_status_tone(message.status),
            priority_tone: priority_tone(message.priority),
            note_count: message.admin_notes.len(),
            responded: message.admin_response.is_some(),
            message,
        }
    }
}

/// Counts for the inbox header, computed from the baseline when the backend sends none.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub total: usize,
    pub unread: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl MessageSummary {
    pub fn of(messages: &[ContactMessage]) -> Self {
        messages.iter().fold(
            MessageSummary {
                total: messages.len(),
                ..Default::default()
            },
            |mut summary, m| {
                if !m.is_read {
                    summary.unread += 1;
                }
                match m.status {
                    ContactStatus::Pending => summary.pending += 1,
                    ContactStatus::InProgress => summary.in_progress += 1,
                    ContactStatus::Resolved => summary.resolved += 1,
                    ContactStatus::Closed => summary.closed += 1,
                }
                summary
            },
        )
    }
}
