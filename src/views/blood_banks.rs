use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{wants_refresh, PageFilters};
use crate::filter::{active, contains_ignore_case, Criteria, Searchable};
use crate::models::{BloodBank, BloodStock, BloodType, HOURS_UNAVAILABLE};
use crate::status::BadgeTone;

/// Below this many units a blood type reads as low.
pub const LOW_STOCK_UNITS: u32 = 10;

impl Searchable for BloodBank {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str()), Cow::Owned(self.address.display())]
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BloodBankFilters {
    pub search: Option<String>,
    pub blood_type: Option<String>,
    pub city: Option<String>,
    pub refresh: Option<String>,
}

impl BloodBankFilters {
    pub fn criteria(&self) -> Criteria<'static, BloodBank> {
        let criteria = Criteria::new()
            .search(self.search.as_deref())
            .when(self.city.as_deref(), |b: &BloodBank, city| {
                contains_ignore_case(&b.address.display(), &city.to_lowercase())
            });

        // A bank only matches a blood type it actually holds units of.
        match active(self.blood_type.as_deref()).map(str::parse::<BloodType>) {
            None => criteria,
            Some(Ok(wanted)) => criteria.push(move |b: &BloodBank| b.blood_stock.units(wanted) > 0),
            Some(Err(_)) => criteria.push(|_: &BloodBank| false),
        }
    }
}

impl PageFilters for BloodBankFilters {
    fn refresh(&self) -> bool {
        wants_refresh(self.refresh.as_deref())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StockLevel {
    Out,
    Low,
    Adequate,
}

impl StockLevel {
    pub fn of(units: u32) -> Self {
        match units {
            0 => StockLevel::Out,
            u if u < LOW_STOCK_UNITS => StockLevel::Low,
            _ => StockLevel::Adequate,
        }
    }

    pub fn tone(&self) -> BadgeTone {
        match self {
            StockLevel::Out => BadgeTone::Danger,
            StockLevel::Low => BadgeTone::Warning,
            StockLevel::Adequate => BadgeTone::Success,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    pub blood_type: BloodType,
    pub units: u32,
    pub level: StockLevel,
    pub tone: BadgeTone,
}

fn stock_rows(stock: &BloodStock) -> Vec<StockRow> {
    stock
        .iter()
        .map(|(blood_type, units)| {
            let level = StockLevel::of(units);
            StockRow {
                blood_type,
                units,
                level,
                tone: level.tone(),
            }
        })
        .collect()
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BloodBankView {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub hours: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub stock: Vec<StockRow>,
    pub total_units: u32,
    pub available_types: Vec<BloodType>,
}

impl From<&BloodBank> for BloodBankView {
    fn from(bank: &BloodBank) -> Self {
        Self {
            id: bank.id.clone(),
            name: bank.name.clone(),
            address: bank.address.display(),
            city: bank.address.city().map(str::to_string),
            hours: bank
                .operating_hours
                .as_ref()
                .map(|h| h.display())
                .unwrap_or_else(|| HOURS_UNAVAILABLE.to_string()),
            phone: bank.phone.clone(),
            email: bank.email.clone(),
            stock: stock_rows(&bank.blood_stock),
            total_units: bank.blood_stock.total(),
            available_types: bank
                .blood_stock
                .iter()
                .filter(|(_, units)| *units > 0)
                .map(|(bt, _)| bt)
                .collect(),
        }
    }
}

/// Full inventory for one bank: every blood type, including those it has no record of.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StockDetail {
    pub bank_id: String,
    pub name: String,
    pub rows: Vec<StockRow>,
    pub total_units: u32,
    pub out_of_stock: Vec<BloodType>,
    pub low_stock: Vec<BloodType>,
}

impl From<&BloodBank> for StockDetail {
    fn from(bank: &BloodBank) -> Self {
        let full: BloodStock = BloodType::ALL
            .iter()
            .map(|bt| (*bt, bank.blood_stock.units(*bt)))
            .collect();
        let rows = stock_rows(&full);
        let with_level = |level: StockLevel| {
            rows.iter()
                .filter(|r| r.level == level)
                .map(|r| r.blood_type)
                .collect::<Vec<_>>()
        };

        Self {
            bank_id: bank.id.clone(),
            name: bank.name.clone(),
            out_of_stock: with_level(StockLevel::Out),
            low_stock: with_level(StockLevel::Low),
            total_units: full.total(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn banks() -> Vec<BloodBank> {
        serde_json::from_value(json!([
            {
                "_id": "b1",
                "name": "Central Blood Bank",
                "address": {"street": "1 Main St", "city": "Austin", "state": "TX"},
                "bloodStock": {"A+": 12, "O-": 0, "_id": "x", "__v": 3},
                "operatingHours": "24/7"
            },
            {
                "_id": "b2",
                "name": "Northside",
                "address": "200 Elm Rd, Dallas, TX",
                "bloodStock": {"O-": 4}
            }
        ]))
        .unwrap()
    }

    fn ids(found: Vec<&BloodBank>) -> Vec<&str> {
        found.into_iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn blood_type_filter_requires_units_on_hand() {
        let banks = banks();
        let filters = BloodBankFilters {
            blood_type: Some("O-".into()),
            ..Default::default()
        };
        assert_eq!(ids(filters.criteria().apply(&banks)), vec!["b2"]);

        let filters = BloodBankFilters {
            blood_type: Some("All".into()),
            ..Default::default()
        };
        assert_eq!(filters.criteria().apply(&banks).len(), 2);

        let filters = BloodBankFilters {
            blood_type: Some("C+".into()),
            ..Default::default()
        };
        assert!(filters.criteria().apply(&banks).is_empty());
    }

    #[test]
    fn city_and_search_read_the_normalized_address() {
        let banks = banks();
        let filters = BloodBankFilters {
            city: Some("dallas".into()),
            ..Default::default()
        };
        assert_eq!(ids(filters.criteria().apply(&banks)), vec!["b2"]);

        let filters = BloodBankFilters {
            search: Some("main st".into()),
            ..Default::default()
        };
        assert_eq!(ids(filters.criteria().apply(&banks)), vec!["b1"]);
    }

    #[test]
    fn view_hides_metadata_keys() {
        let banks = banks();
        let view = BloodBankView::from(&banks[0]);
        let types: Vec<&str> = view.stock.iter().map(|r| r.blood_type.as_str()).collect();
        assert_eq!(types, vec!["O-", "A+"]);
        assert_eq!(view.available_types, vec![BloodType::APositive]);
        assert_eq!(view.total_units, 12);
        assert_eq!(view.hours, "24/7");

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("__v"));
        assert!(!json.contains("\"_id\""));
    }

    #[test]
    fn stock_detail_covers_every_type() {
        let banks = banks();
        let detail = StockDetail::from(&banks[1]);
        assert_eq!(detail.rows.len(), 8);
        assert_eq!(detail.low_stock, vec![BloodType::ONegative]);
        assert_eq!(detail.out_of_stock.len(), 7);
        assert_eq!(detail.total_units, 4);
    }
}
