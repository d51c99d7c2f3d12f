//! Presence and uniqueness rules for rentals.
//!
//! [`check`] is pure: it merges the client's changes over the stored record
//! (if any) and either returns a complete [`RentalFields`] or every presence
//! violation, in attribute declaration order. Uniqueness needs the store, so
//! `RentalService` runs that query itself once presence passes and reports
//! a hit with [`taken`].

use crate::models::rental::{Rental, RentalChanges, RentalFields};
use std::fmt;

pub const BLANK: &str = "can't be blank";
pub const TAKEN: &str = "has already been taken";

/// A validated rental attribute, in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Title,
    Owner,
    City,
    Category,
    Image,
    Bedrooms,
    Description,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::Owner,
        Field::City,
        Field::Category,
        Field::Image,
        Field::Bedrooms,
        Field::Description,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Owner => "owner",
            Field::City => "city",
            Field::Category => "category",
            Field::Image => "image",
            Field::Bedrooms => "bedrooms",
            Field::Description => "description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a write was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub field: Field,
    pub message: &'static str,
}

/// A non-empty, ordered list of violations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Violation> {
        self.0.first()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} {}", v.field, v.message)?;
        }
        Ok(())
    }
}

/// The violation reported when the scope tuple is already in use.
///
/// Always reported against `title`, whichever scope columns collided.
pub fn taken() -> Violations {
    Violations(vec![Violation {
        field: Field::Title,
        message: TAKEN,
    }])
}

/// Merge `changes` over `existing` and check every attribute is present.
pub fn check(
    existing: Option<&Rental>,
    changes: &RentalChanges,
) -> Result<RentalFields, Violations> {
    let base = existing.map(RentalFields::from);

    let title = merge_text(changes.title.as_ref(), base.as_ref().map(|b| &b.title));
    let owner = merge_text(changes.owner.as_ref(), base.as_ref().map(|b| &b.owner));
    let city = merge_text(changes.city.as_ref(), base.as_ref().map(|b| &b.city));
    let category = merge_text(changes.category.as_ref(), base.as_ref().map(|b| &b.category));
    let image = merge_text(changes.image.as_ref(), base.as_ref().map(|b| &b.image));
    let bedrooms = match changes.bedrooms {
        Some(value) => value,
        None => base.as_ref().map(|b| b.bedrooms),
    };
    let description = merge_text(
        changes.description.as_ref(),
        base.as_ref().map(|b| &b.description),
    );

    let mut violations = Vec::new();
    for field in Field::ALL {
        let blank = match field {
            Field::Title => title.is_none(),
            Field::Owner => owner.is_none(),
            Field::City => city.is_none(),
            Field::Category => category.is_none(),
            Field::Image => image.is_none(),
            Field::Bedrooms => bedrooms.is_none(),
            Field::Description => description.is_none(),
        };
        if blank {
            violations.push(Violation {
                field,
                message: BLANK,
            });
        }
    }

    match (title, owner, city, category, image, bedrooms, description) {
        (
            Some(title),
            Some(owner),
            Some(city),
            Some(category),
            Some(image),
            Some(bedrooms),
            Some(description),
        ) => Ok(RentalFields {
            title,
            owner,
            city,
            category,
            image,
            bedrooms,
            description,
        }),
        _ => Err(Violations(violations)),
    }
}

/// Resolve one text attribute, returning `None` when the effective value is blank.
fn merge_text(change: Option<&Option<String>>, stored: Option<&String>) -> Option<String> {
    let effective = match change {
        Some(value) => value.clone(),
        None => stored.cloned(),
    };
    effective.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn mansion() -> RentalFields {
        RentalFields {
            title: "Grand Old Mansion".into(),
            owner: "Veruca Salt".into(),
            city: "San Francisco".into(),
            category: "Estate".into(),
            image: "https://example.com/mansion.jpg".into(),
            bedrooms: 15,
            description: "Sits on over 100 acres of rolling hills.".into(),
        }
    }

    fn stored() -> Rental {
        let f = mansion();
        let now = Utc::now();
        Rental {
            id: 1,
            title: f.title,
            owner: f.owner,
            city: f.city,
            category: f.category,
            image: f.image,
            bedrooms: f.bedrooms,
            description: f.description,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn complete_attributes_pass() {
        let fields = check(None, &RentalChanges::from(mansion())).unwrap();
        assert_eq!(fields, mansion());
    }

    #[test]
    fn empty_create_reports_every_field_in_order() {
        let violations = check(None, &RentalChanges::default()).unwrap_err();
        let fields: Vec<Field> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, Field::ALL.to_vec());
        assert!(violations.iter().all(|v| v.message == BLANK));
    }

    #[test]
    fn whitespace_is_blank_but_zero_bedrooms_is_not() {
        let mut changes = RentalChanges::from(RentalFields {
            bedrooms: 0,
            ..mansion()
        });
        changes.city = Some(Some("   ".into()));

        let violations = check(None, &changes).unwrap_err();
        assert_eq!(violations.iter().count(), 1);
        assert_eq!(
            violations.first(),
            Some(&Violation {
                field: Field::City,
                message: BLANK
            })
        );
    }

    #[test]
    fn update_keeps_absent_fields_and_applies_supplied_ones() {
        let changes = RentalChanges {
            city: Some(Some("Portland".into())),
            ..RentalChanges::default()
        };
        let fields = check(Some(&stored()), &changes).unwrap();
        assert_eq!(
            fields,
            RentalFields {
                city: "Portland".into(),
                ..mansion()
            }
        );
    }

    #[test]
    fn update_with_explicit_null_or_empty_is_blank() {
        let changes = RentalChanges {
            city: Some(Some(String::new())),
            bedrooms: Some(None),
            ..RentalChanges::default()
        };
        let violations = check(Some(&stored()), &changes).unwrap_err();
        let fields: Vec<Field> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec![Field::City, Field::Bedrooms]);
    }

    #[test]
    fn taken_is_reported_against_title() {
        let v = taken();
        assert_eq!(v.to_string(), "title has already been taken");
    }
}
