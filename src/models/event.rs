use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::datetime;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "datetime::deserialize")]
    pub date: DateTime<Utc>,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub max_capacity: u32,
    #[serde(default)]
    pub registered_count: u32,
    #[serde(default)]
    pub registrations: Vec<Registration>,
    #[serde(default)]
    pub status: EventStatus,
    #[serde(default)]
    pub organizer: Option<UserRef>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl Event {
    /// Events without an explicit end are treated as ending when they start.
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.end_date.unwrap_or(self.date)
    }
}

/// Server-assigned approval workflow status.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            "cancelled" | "canceled" => Ok(EventStatus::Cancelled),
            "completed" => Ok(EventStatus::Completed),
            other => Err(format!("unknown event status {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(alias = "user")]
    pub user_id: UserRef,
    #[serde(default)]
    pub status: RegistrationStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Attended,
    Cancelled,
    #[serde(other)]
    Other,
}

/// A user reference that is either a bare id or a populated user document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum UserRef {
    Id(String),
    Populated {
        #[serde(alias = "_id")]
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::Id(id) => id,
            UserRef::Populated { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            UserRef::Id(_) => None,
            UserRef::Populated { name, .. } => name.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_backend_event() {
        let event: Event = serde_json::from_value(json!({
            "_id": "e1",
            "title": "Spring Drive",
            "date": "2025-01-01",
            "endDate": "2025-01-02T00:00:00.000Z",
            "maxCapacity": 50,
            "registeredCount": 2,
            "registrations": [
                {"userId": "u1", "status": "registered"},
                {"user": {"_id": "u2", "name": "Ana"}, "status": "cancelled"},
                {"userId": "u3", "status": "waitlisted"}
            ],
            "status": "approved",
            "organizer": {"_id": "org", "name": "Red Cross"}
        }))
        .unwrap();

        assert_eq!(event.status, EventStatus::Approved);
        assert_eq!(event.registrations[1].user_id.id(), "u2");
        assert_eq!(event.registrations[1].status, RegistrationStatus::Cancelled);
        assert_eq!(event.registrations[2].status, RegistrationStatus::Other);
        assert_eq!(event.organizer.as_ref().and_then(UserRef::name), Some("Red Cross"));
        assert!(event.ends_at() > event.date);
    }

    #[test]
    fn status_parsing_accepts_mixed_case() {
        assert_eq!("Approved".parse::<EventStatus>().unwrap(), EventStatus::Approved);
        assert_eq!("CANCELED".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
        assert!("archived".parse::<EventStatus>().is_err());
    }
}
