//! Shared state handed to every handler.

use crate::services::rental_service::RentalService;
use axum::http::{HeaderMap, header};

#[derive(Clone)]
pub struct AppState {
    pub rentals: RentalService,

    /// Public root used for resource `self` links. When unset the link is
    /// built from the request's `Host` header.
    pub base_url: Option<String>,
}

impl AppState {
    pub fn new(rentals: RentalService, base_url: Option<String>) -> Self {
        Self { rentals, base_url }
    }

    /// Root for links in the response to a request carrying `headers`.
    ///
    /// Empty when neither a configured base nor a `Host` header is
    /// available, which yields path-only links.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.base_url {
            return base.clone();
        }
        headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(|host| format!("http://{}", host))
            .unwrap_or_default()
    }
}
