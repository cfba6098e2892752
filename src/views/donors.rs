use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{wants_refresh, PageFilters};
use crate::filter::{contains_ignore_case, parse_flag, Criteria, Searchable};
use crate::models::{BloodType, Donor};
use crate::status::{donor_availability, next_eligible_in_days, BadgeTone, DonorAvailability};

impl Searchable for Donor {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.name.as_str()),
            Cow::Borrowed(self.city.as_str()),
            Cow::Borrowed(self.state.as_str()),
            Cow::Borrowed(self.blood_type.as_str()),
        ]
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DonorFilters {
    pub search: Option<String>,
    pub blood_type: Option<String>,
    pub city: Option<String>,
    pub available: Option<String>,
    pub refresh: Option<String>,
}

impl DonorFilters {
    /// `available` compares the displayed availability, so a donor flagged
    /// available who gave blood recently does not match `available=true`.
    pub fn criteria(&self, now: DateTime<Utc>) -> Criteria<'static, Donor> {
        Criteria::new()
            .search(self.search.as_deref())
            .equals(self.blood_type.as_deref(), |d: &Donor| d.blood_type)
            .when(self.city.as_deref(), |d: &Donor, city| {
                contains_ignore_case(&d.city, &city.to_lowercase())
            })
            .flag(parse_flag(self.available.as_deref()), move |d: &Donor| {
                donor_availability(d.is_available, d.last_donation_date, now).is_available()
            })
    }
}

impl PageFilters for DonorFilters {
    fn refresh(&self) -> bool {
        wants_refresh(self.refresh.as_deref())
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DonorView {
    pub id: String,
    pub name: String,
    pub blood_type: BloodType,
    pub city: String,
    pub state: String,
    pub location: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub availability: DonorAvailability,
    pub availability_label: &'static str,
    pub availability_tone: BadgeTone,
    pub is_available: bool,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub next_eligible_in_days: Option<i64>,
    pub total_donations: u32,
}

impl DonorView {
    pub fn new(donor: &Donor, now: DateTime<Utc>) -> Self {
        let availability = donor_availability(donor.is_available, donor.last_donation_date, now);
        let location = [donor.city.trim(), donor.state.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            id: donor.id.clone(),
            name: donor.name.clone(),
            blood_type: donor.blood_type,
            city: donor.city.clone(),
            state: donor.state.clone(),
            location,
            email: donor.email.clone(),
            phone: donor.phone.clone(),
            availability,
            availability_label: availability.label(),
            availability_tone: availability.tone(),
            is_available: availability.is_available(),
            last_donation_date: donor.last_donation_date,
            next_eligible_in_days: if donor.is_available {
                next_eligible_in_days(donor.last_donation_date, now)
            } else {
                None
            },
            total_donations: donor.total_donations,
        }
    }
}
