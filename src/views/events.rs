use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{wants_refresh, PageFilters};
use crate::filter::{active, Criteria, Searchable};
use crate::models::{Event, EventStatus};
use crate::registration::{registration_open, RegistrationState};
use crate::status::{capacity, display_status, event_status_tone, BadgeTone, Capacity, DisplayStatus};

impl Searchable for Event {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.title.as_str()),
            Cow::Borrowed(self.description.as_str()),
            Cow::Borrowed(self.location.as_str()),
        ]
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventFilters {
    pub search: Option<String>,
    pub display_status: Option<String>,
    pub status: Option<String>,
    pub refresh: Option<String>,
}

impl EventFilters {
    pub fn criteria(&self, now: DateTime<Utc>) -> Criteria<'static, Event> {
        let criteria = Criteria::new()
            .search(self.search.as_deref())
            .equals(self.status.as_deref(), |e: &Event| e.status);

        match active(self.display_status.as_deref()).map(DisplayStatus::parse) {
            None => criteria,
            Some(Some(wanted)) => criteria.push(move |e: &Event| display_status(now, e.date, e.ends_at()) == wanted),
            Some(None) => criteria.push(|_: &Event| false),
        }
    }
}

impl PageFilters for EventFilters {
    fn refresh(&self) -> bool {
        wants_refresh(self.refresh.as_deref())
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
    pub status_tone: BadgeTone,
    pub display_status: DisplayStatus,
    pub display_label: &'static str,
    pub capacity: Capacity,
    pub capacity_label: String,
    pub max_capacity: u32,
    pub registered_count: u32,
    pub registration: RegistrationState,
    pub registration_open: bool,
    pub organizer: Option<String>,
    pub image_url: Option<String>,
    pub rejection_reason: Option<String>,
}

impl EventView {
    /// `user_id` marks the caller's own registration; anonymous callers are never registered.
    pub fn new(event: &Event, user_id: Option<&str>, now: DateTime<Utc>) -> Self {
        let end_date = event.ends_at();
        let shown = display_status(now, event.date, end_date);
        let capacity = capacity(event.registered_count, event.max_capacity);

        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            end_date,
            location: event.location.clone(),
            status: event.status,
            status_tone: event_status_tone(event.status),
            display_status: shown,
            display_label: shown.label(),
            capacity,
            capacity_label: capacity.label(),
            max_capacity: event.max_capacity,
            registered_count: event.registered_count,
            registration: RegistrationState::of(event, user_id),
            registration_open: registration_open(event, now),
            organizer: event
                .organizer
                .as_ref()
                .map(|o| o.name().unwrap_or(o.id()).to_string()),
            image_url: event.image_url.clone(),
            rejection_reason: event.rejection_reason.clone(),
        }
    }
}
