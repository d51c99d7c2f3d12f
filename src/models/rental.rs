//! Represents a rental listing and the attribute sets used to write one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A persisted rental row.
///
/// Rentals are plain data: every read and write goes through
/// `RentalService`, which owns the `rentals` table.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq, Eq)]
pub struct Rental {
    /// Store-assigned identifier. Never reused once the row is deleted.
    pub id: i64,

    pub title: String,
    pub owner: String,
    pub city: String,
    pub category: String,

    /// Image URL shown with the listing.
    pub image: String,

    /// Zero is a valid number of bedrooms.
    pub bedrooms: i64,

    pub description: String,

    /// Set once, on insert.
    pub created_at: DateTime<Utc>,

    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// A complete, validated attribute set ready to be written.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RentalFields {
    pub title: String,
    pub owner: String,
    pub city: String,
    pub category: String,
    pub image: String,
    pub bedrooms: i64,
    pub description: String,
}

impl From<&Rental> for RentalFields {
    fn from(rental: &Rental) -> Self {
        Self {
            title: rental.title.clone(),
            owner: rental.owner.clone(),
            city: rental.city.clone(),
            category: rental.category.clone(),
            image: rental.image.clone(),
            bedrooms: rental.bedrooms,
            description: rental.description.clone(),
        }
    }
}

/// Attributes supplied by a client for a create or an update.
///
/// The outer `Option` records whether the key was sent at all; the inner one
/// whether it carried a usable value. On update an absent key keeps the
/// stored value while an explicit `null` clears it (and fails validation).
/// Unknown keys are ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct RentalChanges {
    #[serde(default, deserialize_with = "text_attribute")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "text_attribute")]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "text_attribute")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "text_attribute")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "text_attribute")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "integer_attribute")]
    pub bedrooms: Option<Option<i64>>,
    #[serde(default, deserialize_with = "text_attribute")]
    pub description: Option<Option<String>>,
}

impl From<RentalFields> for RentalChanges {
    fn from(fields: RentalFields) -> Self {
        Self {
            title: Some(Some(fields.title)),
            owner: Some(Some(fields.owner)),
            city: Some(Some(fields.city)),
            category: Some(Some(fields.category)),
            image: Some(Some(fields.image)),
            bedrooms: Some(Some(fields.bedrooms)),
            description: Some(Some(fields.description)),
        }
    }
}

/// Cast a text attribute.
///
/// Numbers and booleans are stringified. Arrays and objects are not
/// permitted scalars and are dropped as if the key had not been sent.
fn text_attribute<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s)),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    })
}

/// Cast an integer attribute.
///
/// Floats are truncated and numeric strings parsed; anything else (an empty
/// string included) becomes `null`.
fn integer_attribute<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Some(None),
        Value::Number(n) => Some(n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))),
        Value::String(s) => Some(parse_integer(&s)),
        Value::Bool(_) => Some(None),
        Value::Array(_) | Value::Object(_) => None,
    })
}

fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().ok().or_else(|| {
        trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}
