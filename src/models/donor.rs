use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{datetime, BloodType};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub blood_type: BloodType,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default, deserialize_with = "datetime::deserialize_option")]
    pub last_donation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_donations: u32,
}
