// src/models/restaurant.rs
// DOCUMENTATION: Core data structures for restaurants
// PURPOSE: Normalized restaurant record shared by the store and the exports

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flattened opening hours: "day_0" -> "Monday: 9:00 AM – 10:00 PM"
/// Insertion order is the upstream line order
pub type BusinessHours = IndexMap<String, String>;

/// Placeholder used when the upstream omits a required text field
pub const MISSING_TEXT: &str = "N/A";

/// Normalized restaurant record
/// DOCUMENTATION: Built once per discovered place, never mutated afterwards.
/// `postal_code` is the code that was searched, not the one in the address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    /// Place name ("N/A" if the upstream omitted it)
    pub name: String,

    /// Formatted street address ("N/A" if the upstream omitted it)
    pub address: String,

    /// Postal code used to discover this place
    pub postal_code: String,

    /// Local phone number
    pub phone: Option<String>,

    /// Rating, nominally 0-5 but not validated
    pub rating: Option<f64>,

    /// Number of user ratings
    pub review_count: Option<u32>,

    /// Display cuisine label
    pub cuisine_type: Option<String>,

    /// Opening hours by positional day label
    pub business_hours: Option<BusinessHours>,

    /// Website URL
    pub website: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// When the record was normalized
    created_at: DateTime<Utc>,
}

/// Input for building a Restaurant
/// DOCUMENTATION: All fields as extracted from the upstream payload.
/// `created_at` defaults to the construction time when not supplied.
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub phone: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub cuisine_type: Option<String>,
    pub business_hours: Option<BusinessHours>,
    pub website: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<NewRestaurant> for Restaurant {
    fn from(new: NewRestaurant) -> Self {
        Restaurant {
            name: new.name,
            address: new.address,
            postal_code: new.postal_code,
            phone: new.phone,
            rating: new.rating,
            review_count: new.review_count,
            cuisine_type: new.cuisine_type,
            business_hours: new.business_hours,
            website: new.website,
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: new.created_at.unwrap_or_else(Utc::now),
        }
    }
}

impl Restaurant {
    /// Create a record with only the required fields set
    #[allow(dead_code)]
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        NewRestaurant {
            name: name.into(),
            address: address.into(),
            postal_code: postal_code.into(),
            ..NewRestaurant::default()
        }
        .into()
    }

    /// Normalization timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Serialize to a JSON mapping
    /// DOCUMENTATION: Single serialization shared by the document store and the
    /// JSON export; `created_at` is rendered as ISO-8601 text. The store keeps
    /// its own native timestamp column alongside this document.
    pub fn to_document(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn has_phone(&self) -> bool {
        self.phone.is_some()
    }

    pub fn has_website(&self) -> bool {
        self.website.is_some()
    }
}
