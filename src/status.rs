//! Pure display derivations. None of these touch server-owned state; they are
//! recomputed from the record and the current time on every read.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{ContactStatus, EventStatus, Priority, Urgency};

/// Minimum days between whole-blood donations.
pub const DONATION_INTERVAL_DAYS: i64 = 56;

/// Share of capacity at which an event reads as almost full.
pub const ALMOST_FULL_RATIO: f64 = 0.8;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Upcoming => "Upcoming",
            DisplayStatus::Ongoing => "Ongoing",
            DisplayStatus::Completed => "Completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Some(DisplayStatus::Upcoming),
            "ongoing" => Some(DisplayStatus::Ongoing),
            "completed" | "past" => Some(DisplayStatus::Completed),
            _ => None,
        }
    }
}

pub fn display_status(now: DateTime<Utc>, date: DateTime<Utc>, end_date: DateTime<Utc>) -> DisplayStatus {
    if now > end_date {
        DisplayStatus::Completed
    } else if date <= now {
        DisplayStatus::Ongoing
    } else {
        DisplayStatus::Upcoming
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonorAvailability {
    Available,
    RecentlyDonated,
    NotAvailable,
}

impl DonorAvailability {
    pub fn label(&self) -> &'static str {
        match self {
            DonorAvailability::Available => "Available",
            DonorAvailability::RecentlyDonated => "Recently Donated",
            DonorAvailability::NotAvailable => "Not Available",
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DonorAvailability::Available)
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            DonorAvailability::Available => BadgeTone::Success,
            DonorAvailability::RecentlyDonated => BadgeTone::Warning,
            DonorAvailability::NotAvailable => BadgeTone::Neutral,
        }
    }
}

/// A flagged-available donor still reads as unavailable inside the donation interval.
pub fn donor_availability(
    is_available: bool,
    last_donation: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DonorAvailability {
    if !is_available {
        return DonorAvailability::NotAvailable;
    }
    match last_donation {
        Some(last) if now - last < Duration::days(DONATION_INTERVAL_DAYS) => DonorAvailability::RecentlyDonated,
        _ => DonorAvailability::Available,
    }
}

/// Days until the donor may give again, if still inside the interval.
pub fn next_eligible_in_days(last_donation: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    let last = last_donation?;
    let eligible_at = last + Duration::days(DONATION_INTERVAL_DAYS);
    if eligible_at <= now {
        return None;
    }
    let remaining = eligible_at - now;
    let days = remaining.num_days();
    Some(if remaining > Duration::days(days) { days + 1 } else { days })
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Capacity {
    Unlimited,
    Open { remaining: u32 },
    AlmostFull { remaining: u32 },
    Full,
}

impl Capacity {
    pub fn label(&self) -> String {
        match self {
            Capacity::Unlimited => "Open registration".to_string(),
            Capacity::Open { remaining } => format!("{remaining} spots left"),
            Capacity::AlmostFull { .. } => "Almost Full".to_string(),
            Capacity::Full => "Full".to_string(),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Capacity::Full)
    }
}

/// Reads the server-reported counts only; `registered <= max` is not enforced here.
pub fn capacity(registered: u32, max: u32) -> Capacity {
    if max == 0 {
        return Capacity::Unlimited;
    }
    if registered >= max {
        return Capacity::Full;
    }
    let remaining = max - registered;
    if f64::from(registered) >= f64::from(max) * ALMOST_FULL_RATIO {
        Capacity::AlmostFull { remaining }
    } else {
        Capacity::Open { remaining }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyTier {
    pub label: &'static str,
    pub response_time: &'static str,
    pub tone: BadgeTone,
}

pub fn urgency_tier(urgency: Urgency) -> UrgencyTier {
    match urgency {
        Urgency::Critical => UrgencyTier {
            label: "Critical",
            response_time: "Within 2 hours",
            tone: BadgeTone::Danger,
        },
        Urgency::High => UrgencyTier {
            label: "High",
            response_time: "Within 24 hours",
            tone: BadgeTone::Warning,
        },
        Urgency::Medium => UrgencyTier {
            label: "Medium",
            response_time: "Within 3 days",
            tone: BadgeTone::Info,
        },
        Urgency::Low => UrgencyTier {
            label: "Low",
            response_time: "Within a week",
            tone: BadgeTone::Neutral,
        },
    }
}

pub fn deadline_label(needed_by: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if needed_by <= now {
        return "Overdue".to_string();
    }
    let remaining = needed_by - now;
    let hours = remaining.num_hours();
    if hours < 1 {
        format!("{} minutes left", remaining.num_minutes().max(1))
    } else if hours < 48 {
        format!("{hours} hours left")
    } else {
        format!("{} days left", remaining.num_days())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    Danger,
    Warning,
    Info,
    Success,
    Neutral,
}

pub fn contact_status_tone(status: ContactStatus) -> BadgeTone {
    match status {
        ContactStatus::Pending => BadgeTone::Warning,
        ContactStatus::InProgress => BadgeTone::Info,
        ContactStatus::Resolved => BadgeTone::Success,
        ContactStatus::Closed => BadgeTone::Neutral,
    }
}

pub fn priority_tone(priority: Priority) -> BadgeTone {
    match priority {
        Priority::Urgent => BadgeTone::Danger,
        Priority::High => BadgeTone::Warning,
        Priority::Medium => BadgeTone::Info,
        Priority::Low => BadgeTone::Neutral,
    }
}

pub fn event_status_tone(status: EventStatus) -> BadgeTone {
    match status {
        EventStatus::Approved => BadgeTone::Success,
        EventStatus::Pending => BadgeTone::Warning,
        EventStatus::Rejected => BadgeTone::Danger,
        EventStatus::Cancelled | EventStatus::Completed => BadgeTone::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn event_display_status_examples() {
        let date = at(2025, 1, 1, 0);
        let end = at(2025, 1, 2, 0);
        assert_eq!(display_status(at(2025, 1, 3, 0), date, end), DisplayStatus::Completed);
        assert_eq!(display_status(at(2025, 1, 1, 12), date, end), DisplayStatus::Ongoing);
        assert_eq!(display_status(at(2024, 12, 31, 0), date, end), DisplayStatus::Upcoming);
    }

    #[test]
    fn event_display_status_boundaries_are_ongoing() {
        let date = at(2025, 1, 1, 0);
        let end = at(2025, 1, 2, 0);
        assert_eq!(display_status(date, date, end), DisplayStatus::Ongoing);
        assert_eq!(display_status(end, date, end), DisplayStatus::Ongoing);
    }

    #[test]
    fn donor_availability_rule() {
        let now = at(2025, 6, 1, 0);
        assert_eq!(
            donor_availability(true, Some(now - Duration::days(10)), now),
            DonorAvailability::RecentlyDonated
        );
        assert_eq!(
            donor_availability(true, Some(now - Duration::days(100)), now),
            DonorAvailability::Available
        );
        assert_eq!(donor_availability(true, None, now), DonorAvailability::Available);
        assert_eq!(
            donor_availability(false, Some(now - Duration::days(100)), now),
            DonorAvailability::NotAvailable
        );
        assert_eq!(donor_availability(false, None, now).label(), "Not Available");
    }

    #[test]
    fn donation_interval_boundary() {
        let now = at(2025, 6, 1, 0);
        let exactly = now - Duration::days(DONATION_INTERVAL_DAYS);
        assert_eq!(donor_availability(true, Some(exactly), now), DonorAvailability::Available);
        assert_eq!(next_eligible_in_days(Some(exactly), now), None);
        assert_eq!(next_eligible_in_days(Some(now - Duration::days(10)), now), Some(46));
    }

    #[test]
    fn capacity_labels() {
        assert_eq!(capacity(0, 0), Capacity::Unlimited);
        assert_eq!(capacity(10, 50), Capacity::Open { remaining: 40 });
        assert_eq!(capacity(40, 50), Capacity::AlmostFull { remaining: 10 });
        assert_eq!(capacity(50, 50), Capacity::Full);
        assert_eq!(capacity(53, 50).label(), "Full");
        assert_eq!(capacity(1, 10).label(), "9 spots left");
    }

    #[test]
    fn urgency_tiers_are_fixed() {
        assert_eq!(urgency_tier(Urgency::Critical).response_time, "Within 2 hours");
        assert_eq!(urgency_tier(Urgency::Critical).tone, BadgeTone::Danger);
        assert_eq!(urgency_tier(Urgency::Low).label, "Low");
    }

    #[test]
    fn deadline_labels() {
        let now = at(2025, 6, 1, 0);
        assert_eq!(deadline_label(now - Duration::hours(1), now), "Overdue");
        assert_eq!(deadline_label(now + Duration::hours(5), now), "5 hours left");
        assert_eq!(deadline_label(now + Duration::days(3), now), "3 days left");
        assert_eq!(deadline_label(now + Duration::minutes(20), now), "20 minutes left");
    }

    #[test]
    fn badge_tones() {
        assert_eq!(contact_status_tone(ContactStatus::Resolved), BadgeTone::Success);
        assert_eq!(priority_tone(Priority::Urgent), BadgeTone::Danger);
        assert_eq!(event_status_tone(EventStatus::Rejected), BadgeTone::Danger);
    }
}
