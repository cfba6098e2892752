//! Page view models.
//!
//! Each page has a filter set (the raw query values it sends) and a display
//! projection of its records. Filter sets turn into [`Criteria`] over the
//! baseline; projections add the derived labels and badge tones the page shows.
//!
//! [`Criteria`]: crate::filter::Criteria

pub mod blood_banks;
pub mod donors;
pub mod events;
pub mod messages;
pub mod requests;

pub use blood_banks::{BloodBankFilters, BloodBankView, StockDetail, StockLevel, StockRow};
pub use donors::{DonorFilters, DonorView};
pub use events::{EventFilters, EventView};
pub use messages::{MessageFilters, MessageSummary, MessageView};
pub use requests::{RequestFilters, RequestView};

/// Every filter set can ask for the baseline to be refetched first.
pub trait PageFilters {
    fn refresh(&self) -> bool;
}

pub(crate) fn wants_refresh(value: Option<&str>) -> bool {
    matches!(crate::filter::parse_flag(value), Some(true))
}
