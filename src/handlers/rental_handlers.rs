//! HTTP handlers for the `rentals` resource.
//! Unwraps JSON:API request documents, delegates to `RentalService` and
//! renders the results as JSON:API documents.

use crate::{
    errors::AppError,
    models::document::{Document, RESOURCE_TYPE, RentalResource, RequestData, RequestDocument},
    response::JsonApi,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

/// `GET /rentals`: every rental, oldest first.
pub async fn list_rentals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let base = state.base_url(&headers);
    let rentals = state.rentals.list().await?;
    let data = rentals
        .iter()
        .map(|rental| RentalResource::new(rental, &base))
        .collect::<Vec<_>>();

    Ok(JsonApi(StatusCode::OK, Document { data }))
}

/// `GET /rentals/{id}`
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let rental_id = parse_id(&id)?;
    let rental = state.rentals.get(rental_id).await?;
    let base = state.base_url(&headers);

    Ok(JsonApi(
        StatusCode::OK,
        Document {
            data: RentalResource::new(&rental, &base),
        },
    ))
}

/// `POST /rentals`: 201 with the new resource and a `Location` header.
pub async fn create_rental(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RequestDocument>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(document) = payload?;
    let data = request_data(document)?;

    let rental = state.rentals.create(&data.attributes).await?;
    let resource = RentalResource::new(&rental, &state.base_url(&headers));
    let location = HeaderValue::from_str(&resource.links.self_link).ok();

    let mut response = JsonApi(StatusCode::CREATED, Document { data: resource }).into_response();
    if let Some(location) = location {
        response.headers_mut().insert(header::LOCATION, location);
    }
    Ok(response)
}

/// `PATCH /rentals/{id}`: partial update; absent attributes are kept.
pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<RequestDocument>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let rental_id = parse_id(&id)?;
    let Json(document) = payload?;
    let data = request_data(document)?;
    if !data.id_matches(&id) {
        return Err(AppError::bad_request(
            "Key is not included in URL",
            format!("The URL does not support the key {}", id),
        ));
    }

    let rental = state.rentals.update(rental_id, &data.attributes).await?;
    let base = state.base_url(&headers);

    Ok(JsonApi(
        StatusCode::OK,
        Document {
            data: RentalResource::new(&rental, &base),
        },
    ))
}

/// `DELETE /rentals/{id}`: 200 with an empty body.
pub async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let rental_id = parse_id(&id)?;
    state.rentals.delete(rental_id).await?;
    Ok(StatusCode::OK)
}

/// Fallback for paths outside the resource.
pub async fn route_not_found(uri: Uri) -> AppError {
    AppError::new(
        StatusCode::NOT_FOUND,
        "Not Found",
        format!("No route matches {}", uri.path()),
    )
}

/// An id that is not an integer can never name a record.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| AppError::not_found(raw))
}

/// Pull `data` out of a write request and check its `type`.
fn request_data(document: RequestDocument) -> Result<RequestData, AppError> {
    let data = document.data.ok_or_else(|| {
        AppError::bad_request(
            "Missing Parameter",
            "The required parameter, data, is missing.",
        )
    })?;

    match data.kind.as_deref() {
        Some(kind) if kind != RESOURCE_TYPE => Err(AppError::new(
            StatusCode::CONFLICT,
            "Invalid resource type",
            format!("{} is not a valid resource.", kind),
        )),
        _ => Ok(data),
    }
}
