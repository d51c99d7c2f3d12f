//! Domain services: the rental repository and the rules it enforces.

pub mod rental_service;
pub mod validation;
