//! Defines routes for the JSON:API `rentals` resource.
//!
//! ## Structure
//! - **Collection endpoints**
//!   - `GET    /rentals`: list every rental
//!   - `POST   /rentals`: create a rental
//!
//! - **Member endpoints**
//!   - `GET    /rentals/{id}`: show one rental
//!   - `PATCH  /rentals/{id}`: update supplied attributes
//!   - `DELETE /rentals/{id}`: delete permanently
//!
//! Anything else answers with a JSON:API 404 document.

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        rental_handlers::{
            create_rental, delete_rental, get_rental, list_rentals, route_not_found,
            update_rental,
        },
    },
    state::AppState,
};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Build the route table. The router carries shared state (`AppState`).
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/rentals", get(list_rentals).post(create_rental))
        .route(
            "/rentals/{id}",
            get(get_rental).patch(update_rental).delete(delete_rental),
        )
        .fallback(route_not_found)
}

/// The complete application: routes, request tracing and state.
pub fn app(state: AppState) -> Router {
    routes().layer(TraceLayer::new_for_http()).with_state(state)
}
