use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, profiledb::ProfileExt},
    dtos::{
        bookingdtos::CreateBookingDto,
        customerdtos::{SearchProvidersQuery, UpdateCustomerDto},
        providerdtos::LocationUpdateDto,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn customer_handler() -> Router {
    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/providers/search", get(search_providers))
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/location", post(update_location))
        .route("/bookings/:booking_id/tracking", get(tracking))
        .layer(axum::middleware::from_fn(crate::middleware::require_customer))
}

pub async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let customer = app_state
        .db_client
        .get_customer_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Customer profile not found"))?;

    Ok(Json(customer))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateCustomerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let customer = app_state
        .db_client
        .update_customer_profile(
            auth.user.id,
            body.email,
            body.service_preference,
            body.address,
            body.lat,
            body.lng,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Customer profile not found"))?;

    Ok(Json(customer))
}

/// Provider directory search: service type plus a fuzzy area match,
/// best-rated first. Falls back to an area-less search rather than
/// returning an empty list.
pub async fn search_providers(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<SearchProvidersQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let customer = app_state
        .db_client
        .get_customer_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Default the area to the first segment of the customer's address
    let customer_area = customer
        .as_ref()
        .and_then(|c| c.address.split(',').next())
        .map(|s| s.trim().to_string());

    let search_area = query
        .service_area
        .clone()
        .or_else(|| query.company_name.clone())
        .or(customer_area);

    let mut providers = app_state
        .db_client
        .search_providers(query.service_type.as_deref(), search_area.as_deref())
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if providers.is_empty() && search_area.is_some() && query.company_name.is_none() {
        tracing::debug!("no providers found in area, relaxing location filter");
        providers = app_state
            .db_client
            .search_providers(query.service_type.as_deref(), None)
            .await
            .map_err(|e| HttpError::server_error(e.to_string()))?;
    }

    Ok(Json(providers))
}

pub async fn create_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .booking_service
        .create_booking(
            &auth.user,
            body.provider_id,
            body.service_type,
            body.description,
            body.scheduled_time,
            body.amount,
            body.insurance_opted.unwrap_or(false),
        )
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let customer = app_state
        .db_client
        .get_customer_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Customer profile not found"))?;

    let bookings = app_state
        .db_client
        .get_bookings_by_customer(customer.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(bookings))
}

pub async fn update_location(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<LocationUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .location_service
        .update_customer_location(&auth.user, body.lat, body.lng, body.booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn tracking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let info = app_state
        .location_service
        .tracking(&auth.user, booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(info))
}
