//! JSON:API envelopes for the `rentals` resource.

use crate::models::rental::{Rental, RentalChanges, RentalFields};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Media type accepted and emitted by every endpoint.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// JSON:API `type` member for rentals.
pub const RESOURCE_TYPE: &str = "rentals";

/// Top-level success document: `{ "data": ... }`.
#[derive(Serialize, Debug)]
pub struct Document<T> {
    pub data: T,
}

/// A single rental rendered as a JSON:API resource object.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RentalResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub links: ResourceLinks,
    pub attributes: RentalFields,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

impl RentalResource {
    /// Render `rental` with a self link rooted at `base_url`.
    pub fn new(rental: &Rental, base_url: &str) -> Self {
        Self {
            id: rental.id.to_string(),
            kind: RESOURCE_TYPE,
            links: ResourceLinks {
                self_link: self_link(base_url, rental.id),
            },
            attributes: RentalFields::from(rental),
        }
    }
}

/// `<base_url>/rentals/<id>`, tolerating a trailing slash on the base.
pub fn self_link(base_url: &str, id: i64) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), RESOURCE_TYPE, id)
}

/// Body of `POST /rentals` and `PATCH /rentals/{id}`.
#[derive(Deserialize, Debug)]
pub struct RequestDocument {
    pub data: Option<RequestData>,
}

/// The `data` member of a write request.
///
/// `id` may arrive as a string or a number, so it is kept raw and compared
/// through [`RequestData::id_matches`].
#[derive(Deserialize, Debug)]
pub struct RequestData {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub attributes: RentalChanges,
}

impl RequestData {
    /// True when no `id` was sent or it names `expected`.
    pub fn id_matches(&self, expected: &str) -> bool {
        match &self.id {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s == expected,
            Some(Value::Number(n)) => n.to_string() == expected,
            Some(_) => false,
        }
    }
}

/// Top-level error document: `{ "errors": [...] }`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDocument {
    pub errors: Vec<ErrorObject>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorObject {
    pub title: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorSource {
    pub pointer: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn resource_object_shape() {
        let now = Utc::now();
        let rental = Rental {
            id: 7,
            title: "Urban Living".into(),
            owner: "Mike Teavee".into(),
            city: "Seattle".into(),
            category: "Condo".into(),
            image: "https://example.com/condo.jpg".into(),
            bedrooms: 1,
            description: "A commuter's dream.".into(),
            created_at: now,
            updated_at: now,
        };

        let resource = RentalResource::new(&rental, "http://localhost:3000/");
        let rendered = serde_json::to_value(resource).unwrap();
        assert_eq!(
            rendered,
            json!({
                "id": "7",
                "type": "rentals",
                "links": { "self": "http://localhost:3000/rentals/7" },
                "attributes": {
                    "title": "Urban Living",
                    "owner": "Mike Teavee",
                    "city": "Seattle",
                    "category": "Condo",
                    "image": "https://example.com/condo.jpg",
                    "bedrooms": 1,
                    "description": "A commuter's dream."
                }
            })
        );
    }

    #[test]
    fn request_id_accepts_string_or_number() {
        let doc: RequestDocument =
            serde_json::from_value(json!({ "data": { "id": 3, "type": "rentals" } })).unwrap();
        let data = doc.data.unwrap();
        assert!(data.id_matches("3"));
        assert!(!data.id_matches("4"));
        assert_eq!(data.attributes, RentalChanges::default());
    }
}
