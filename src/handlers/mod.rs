pub mod health_handlers;
pub mod rental_handlers;
