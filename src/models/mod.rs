//! Core data models for the rentals service.
//!
//! `rental` holds the stored entity and the attribute sets used to write it;
//! `document` holds the JSON:API envelopes exchanged over HTTP.

pub mod document;
pub mod rental;
