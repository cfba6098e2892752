use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::BloodType;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BloodBank {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: AddressField,
    #[serde(default)]
    pub blood_stock: BloodStock,
    #[serde(default)]
    pub operating_hours: Option<HoursField>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Address as either free text or a structured record; older records carry the string form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum AddressField {
    Text(String),
    Structured(StructuredAddress),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StructuredAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "zip", alias = "pincode")]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Default for AddressField {
    fn default() -> Self {
        AddressField::Text(String::new())
    }
}

impl AddressField {
    /// Single-line canonical form used by every view and by the text filters.
    pub fn display(&self) -> String {
        match self {
            AddressField::Text(text) => text.trim().to_string(),
            AddressField::Structured(addr) => {
                let state_zip = match (non_blank(&addr.state), non_blank(&addr.zip_code)) {
                    (Some(s), Some(z)) => Some(format!("{s} {z}")),
                    (Some(s), None) => Some(s.to_string()),
                    (None, Some(z)) => Some(z.to_string()),
                    (None, None) => None,
                };
                [
                    non_blank(&addr.street).map(str::to_string),
                    non_blank(&addr.city).map(str::to_string),
                    state_zip,
                    non_blank(&addr.country).map(str::to_string),
                ]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(", ")
            }
        }
    }

    pub fn city(&self) -> Option<&str> {
        match self {
            AddressField::Text(_) => None,
            AddressField::Structured(addr) => non_blank(&addr.city),
        }
    }
}

/// Opening hours as either free text or a per-weekday schedule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum HoursField {
    Text(String),
    Weekly(WeeklyHours),
}

/// Schedule keyed by weekday name. Keys that are not weekdays (`_id`, `__v`)
/// and values that are not hour records are dropped rather than failing the bank.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct WeeklyHours(BTreeMap<String, DayHours>);

impl WeeklyHours {
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let days = raw
            .iter()
            .filter(|(key, _)| weekday(key).is_some())
            .filter_map(|(key, value)| Some((key.clone(), DayHours::deserialize(value).ok()?)))
            .collect();
        WeeklyHours(days)
    }

    fn get(&self, day: &str) -> Option<&DayHours> {
        self.0
            .iter()
            .find(|(key, _)| weekday(key) == Some(day))
            .map(|(_, hours)| hours)
    }
}

impl<'de> Deserialize<'de> for WeeklyHours {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Ok(WeeklyHours::from_raw(&raw))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayHours {
    #[serde(default)]
    pub open: Option<String>,
    #[serde(default)]
    pub close: Option<String>,
    #[serde(default, alias = "isClosed")]
    pub closed: bool,
}

const WEEKDAYS: [(&str, &str); 7] = [
    ("monday", "Mon"),
    ("tuesday", "Tue"),
    ("wednesday", "Wed"),
    ("thursday", "Thu"),
    ("friday", "Fri"),
    ("saturday", "Sat"),
    ("sunday", "Sun"),
];

/// Canonical long weekday name for a schedule key such as `Monday` or `mon`.
fn weekday(key: &str) -> Option<&'static str> {
    WEEKDAYS
        .iter()
        .find(|(day, short)| key.eq_ignore_ascii_case(day) || key.eq_ignore_ascii_case(short))
        .map(|(day, _)| *day)
}

pub const HOURS_UNAVAILABLE: &str = "Hours not available";

impl HoursField {
    pub fn display(&self) -> String {
        match self {
            HoursField::Text(text) if text.trim().is_empty() => HOURS_UNAVAILABLE.to_string(),
            HoursField::Text(text) => text.trim().to_string(),
            HoursField::Weekly(days) => {
                let lines: Vec<String> = WEEKDAYS
                    .iter()
                    .filter_map(|(day, short)| {
                        let hours = days.get(day)?;
                        Some(format!("{short}: {}", hours.display()))
                    })
                    .collect();
                if lines.is_empty() {
                    HOURS_UNAVAILABLE.to_string()
                } else {
                    lines.join("; ")
                }
            }
        }
    }
}

impl DayHours {
    fn display(&self) -> String {
        if self.closed {
            return "Closed".to_string();
        }
        match (non_blank(&self.open), non_blank(&self.close)) {
            (Some(open), Some(close)) => format!("{open} - {close}"),
            (Some(open), None) => format!("from {open}"),
            (None, Some(close)) => format!("until {close}"),
            (None, None) => "Closed".to_string(),
        }
    }
}

/// Units on hand per blood type. Built from the raw stock object with every
/// non-blood-type key (`_id`, `__v`, timestamps) and every non-count value dropped.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BloodStock(BTreeMap<BloodType, u32>);

impl BloodStock {
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let units = raw
            .iter()
            .filter_map(|(key, value)| {
                let blood_type = key.parse::<BloodType>().ok()?;
                Some((blood_type, unit_count(value)?))
            })
            .collect();
        BloodStock(units)
    }

    pub fn units(&self, blood_type: BloodType) -> u32 {
        self.0.get(&blood_type).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BloodType, u32)> + '_ {
        self.0.iter().map(|(bt, units)| (*bt, *units))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(BloodType, u32)> for BloodStock {
    fn from_iter<I: IntoIterator<Item = (BloodType, u32)>>(iter: I) -> Self {
        BloodStock(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for BloodStock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(raw.map(|m| BloodStock::from_raw(&m)).unwrap_or_default())
    }
}

fn unit_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|u| u32::try_from(u).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
