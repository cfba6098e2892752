use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{wants_refresh, PageFilters};
use crate::filter::{Criteria, Searchable};
use crate::models::{BloodRequest, BloodType, Urgency};
use crate::status::{deadline_label, urgency_tier, UrgencyTier};

impl Searchable for BloodRequest {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.patient_name.as_str()),
            Cow::Borrowed(self.hospital_name.as_str()),
        ]
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilters {
    pub search: Option<String>,
    pub blood_type: Option<String>,
    pub urgency: Option<String>,
    pub refresh: Option<String>,
}

impl RequestFilters {
    pub fn criteria(&self) -> Criteria<'static, BloodRequest> {
        Criteria::new()
            .search(self.search.as_deref())
            .equals(self.blood_type.as_deref(), |r: &BloodRequest| r.blood_type)
            .equals(self.urgency.as_deref(), |r: &BloodRequest| r.urgency)
    }
}

impl PageFilters for RequestFilters {
    fn refresh(&self) -> bool {
        wants_refresh(self.refresh.as_deref())
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    pub id: Option<String>,
    pub blood_type: BloodType,
    pub units_needed: u32,
    pub urgency: Urgency,
    pub tier: UrgencyTier,
    pub needed_by: DateTime<Utc>,
    pub deadline: String,
    pub overdue: bool,
    pub patient_name: String,
    pub hospital_name: String,
    pub contact_number: Option<String>,
    pub status: Option<String>,
}

impl RequestView {
    pub fn new(request: &BloodRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: request.id.clone(),
            blood_type: request.blood_type,
            units_needed: request.units_needed,
            urgency: request.urgency,
            tier: urgency_tier(request.urgency),
            needed_by: request.needed_by,
            deadline: deadline_label(request.needed_by, now),
            overdue: request.needed_by <= now,
            patient_name: request.patient_name.clone(),
            hospital_name: request.hospital_name.clone(),
            contact_number: request.contact_number.clone(),
            status: request.status.clone(),
        }
    }
}
