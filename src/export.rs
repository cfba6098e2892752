use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{ContactMessage, Donor};
use crate::status::donor_availability;

const MESSAGE_HEADER: [&str; 11] = [
    "id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "subject",
    "message",
    "status",
    "priority",
    "is_read",
    "created_at",
];

const DONOR_HEADER: [&str; 8] = [
    "id",
    "name",
    "blood_type",
    "city",
    "state",
    "availability",
    "last_donation_date",
    "total_donations",
];

fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map(|d| d.to_rfc3339()).unwrap_or_default()
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("csv flush failed: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("csv was not utf-8: {e}")))
}

pub fn messages_csv(messages: &[&ContactMessage]) -> Result<String, AppError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(MESSAGE_HEADER)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    for m in messages {
        w.write_record([
            m.id.as_str(),
            m.first_name.as_str(),
            m.last_name.as_str(),
            m.email.as_str(),
            m.phone.as_deref().unwrap_or_default(),
            m.subject.as_str(),
            m.message.as_str(),
            m.status.as_str(),
            m.priority.as_str(),
            if m.is_read { "true" } else { "false" },
            format_date(m.created_at).as_str(),
        ])
        .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    finish(w)
}

/// Availability is exported as displayed, i.e. with the donation-interval rule applied.
pub fn donors_csv(donors: &[&Donor], now: DateTime<Utc>) -> Result<String, AppError> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(DONOR_HEADER)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    for d in donors {
        let availability = donor_availability(d.is_available, d.last_donation_date, now);
        w.write_record([
            d.id.as_str(),
            d.name.as_str(),
            d.blood_type.as_str(),
            d.city.as_str(),
            d.state.as_str(),
            availability.label(),
            format_date(d.last_donation_date).as_str(),
            d.total_donations.to_string().as_str(),
        ])
        .map_err(|e| AppError::Internal(e.to_string()))?;
    }
    finish(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    #[test]
    fn messages_are_quoted_when_needed() {
        let msg: ContactMessage = serde_json::from_value(json!({
            "id": "m1",
            "firstName": "Sam",
            "lastName": "O'Neil",
            "email": "sam@example.org",
            "subject": "Hours, again",
            "message": "Line one\nLine \"two\"",
            "status": "resolved",
            "priority": "high",
            "isRead": true,
            "createdAt": "2025-02-01T10:00:00Z"
        }))
        .unwrap();

        let out = messages_csv(&[&msg]).unwrap();
        let mut lines = out.splitn(2, '\n');
        assert_eq!(
            lines.next().unwrap(),
            "id,first_name,last_name,email,phone,subject,message,status,priority,is_read,created_at"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("m1,Sam,O'Neil,sam@example.org,,\"Hours, again\",\"Line one\nLine \"\"two\"\"\","));
        assert!(row.contains("resolved,high,true,2025-02-01T10:00:00+00:00"));

        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][6], "Line one\nLine \"two\"");
    }

    #[test]
    fn donors_export_derived_availability() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let donor: Donor = serde_json::from_value(json!({
            "_id": "d1",
            "name": "Kim",
            "bloodType": "A-",
            "city": "Austin",
            "state": "TX",
            "isAvailable": true,
            "lastDonationDate": (now - Duration::days(10)).to_rfc3339(),
            "totalDonations": 4
        }))
        .unwrap();
        let out = donors_csv(&[&donor], now).unwrap();
        assert!(out.contains("d1,Kim,A-,Austin,TX,Recently Donated,"));
        assert!(out.trim_end().ends_with(",4"));
    }

    #[test]
    fn empty_export_has_header_only() {
        let out = messages_csv(&[]).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
