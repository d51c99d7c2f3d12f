//! HTTP error type rendered as a JSON:API error document.

use crate::{
    models::document::{ErrorDocument, ErrorObject, ErrorSource},
    response::JsonApi,
    services::{rental_service::RentalError, validation::Violations},
};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

pub const RECORD_NOT_FOUND: &str = "Record not found";

/// Every failure a handler can return, already shaped for the wire.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub errors: Vec<ErrorObject>,
}

impl AppError {
    /// A single error object with the given status, title and detail.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status,
            errors: vec![ErrorObject {
                title: title.into(),
                detail: detail.into(),
                code: Some(status.as_u16().to_string()),
                status: status.as_u16().to_string(),
                source: None,
            }],
        }
    }

    /// Shortcut for 404 Not Found on the record identified by `key`.
    pub fn not_found(key: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            RECORD_NOT_FOUND,
            format!("The record identified by {} could not be found.", key),
        )
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title, detail)
    }

    /// Shortcut for a 500 Internal Server Error. The detail never carries
    /// the underlying cause.
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Internal Server Error",
        )
    }

    /// Shortcut for 503 Service Unavailable
    pub fn unavailable() -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "The rental store is unavailable.",
        )
    }

    /// 422 with one error object per violation, in order.
    pub fn unprocessable(violations: &Violations) -> Self {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        let errors = violations
            .iter()
            .map(|v| ErrorObject {
                title: v.message.to_string(),
                detail: format!("{} - {}", v.field, v.message),
                code: Some("100".into()),
                status: status.as_u16().to_string(),
                source: Some(ErrorSource {
                    pointer: format!("/data/attributes/{}", v.field),
                }),
            })
            .collect();
        Self { status, errors }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(first) => write!(f, "{}: {}", self.status, first.detail),
            None => write!(f, "{}", self.status),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        JsonApi(
            self.status,
            ErrorDocument {
                errors: self.errors,
            },
        )
        .into_response()
    }
}

impl From<RentalError> for AppError {
    fn from(err: RentalError) -> Self {
        match err {
            RentalError::NotFound(id) => AppError::not_found(id),
            RentalError::Invalid(violations) => AppError::unprocessable(&violations),
            RentalError::Store(err) => {
                tracing::error!(error = %err, "rental store failure");
                if is_store_unavailable(&err) {
                    AppError::unavailable()
                } else {
                    AppError::internal()
                }
            }
        }
    }
}

/// Transient store conditions: pool exhaustion, I/O, and a database that
/// stayed busy or locked past the busy timeout.
fn is_store_unavailable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // extended result codes keep the primary code in the low byte
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        _ => false,
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        let title = status.canonical_reason().unwrap_or("Bad Request");
        if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
            AppError::new(
                status,
                title,
                "Expected request with `Content-Type: application/vnd.api+json`",
            )
        } else {
            AppError::new(status, title, rejection.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::{str::FromStr, time::Duration};

    #[test]
    fn taken_maps_to_422_pointing_at_title() {
        let err = AppError::from(RentalError::Invalid(validation::taken()));
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].title, "has already been taken");
        assert_eq!(err.errors[0].status, "422");
        assert_eq!(
            err.errors[0].source,
            Some(ErrorSource {
                pointer: "/data/attributes/title".into()
            })
        );
    }

    #[test]
    fn not_found_uses_fixed_title() {
        let err = AppError::from(RentalError::NotFound(9));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.errors[0].title, RECORD_NOT_FOUND);
        assert_eq!(
            err.errors[0].detail,
            "The record identified by 9 could not be found."
        );
    }

    #[test]
    fn store_failures_hide_the_cause() {
        let err = AppError::from(RentalError::Store(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err = AppError::from(RentalError::Store(sqlx::Error::RowNotFound));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.errors[0].detail, "Internal Server Error");
    }

    #[tokio::test]
    async fn busy_database_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("busy.db").display());
        let options = SqliteConnectOptions::from_str(&url)
            .unwrap()
            .create_if_missing(true)
            .busy_timeout(Duration::ZERO);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(options)
            .await
            .unwrap();

        let _writer = pool.begin_with("BEGIN IMMEDIATE").await.unwrap();
        let busy = pool.begin_with("BEGIN IMMEDIATE").await.unwrap_err();

        let err = AppError::from(RentalError::Store(busy));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.errors[0].title, "Service Unavailable");
    }
}
