//! Records received from the backend. The portal never owns their lifecycle;
//! these are transient copies used for filtering and display.

pub mod blood_bank;
pub mod blood_request;
pub mod blood_type;
pub mod contact;
pub mod datetime;
pub mod donor;
pub mod envelope;
pub mod event;

pub use blood_bank::{AddressField, BloodBank, BloodStock, HoursField, WeeklyHours, HOURS_UNAVAILABLE};
pub use blood_request::{BloodRequest, Urgency};
pub use blood_type::BloodType;
pub use contact::{ContactMessage, ContactStatus, Priority};
pub use donor::Donor;
pub use envelope::ApiEnvelope;
pub use event::{Event, EventStatus, Registration, RegistrationStatus, UserRef};
