use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use num_traits::ToPrimitive;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, profiledb::ProfileExt},
    dtos::{
        bookingdtos::{ApiResponse, DecisionDto, VerifyQrDto},
        providerdtos::{LocationUpdateDto, PayoutSummaryDto, UpdateProviderDto},
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    service::booking_service::Decision,
    AppState,
};

pub fn provider_handler() -> Router {
    let provider_only = Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:booking_id/decision", post(decide_job))
        .route("/location", post(update_location))
        .route("/payout-summary", get(payout_summary))
        .layer(axum::middleware::from_fn(crate::middleware::require_provider));

    // Digital-id verification is done by the scanning customer, so it only
    // needs an authenticated caller
    Router::new()
        .merge(provider_only)
        .route("/verify-qr", post(verify_digital_id))
}

pub async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let provider = app_state
        .db_client
        .get_provider_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider profile not found"))?;

    Ok(Json(provider))
}

pub async fn update_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateProviderDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let provider = app_state
        .db_client
        .update_provider_profile(
            auth.user.id,
            body.age,
            body.service_type,
            body.specialization,
            body.identity_proof,
            body.service_area,
            body.available_timings,
            body.experience_years,
            body.emergency_service,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider profile not found"))?;

    Ok(Json(provider))
}

/// Incoming job requests for this provider, newest first.
pub async fn list_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let provider = app_state
        .db_client
        .get_provider_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider profile not found"))?;

    let jobs = app_state
        .db_client
        .get_bookings_by_provider(provider.id, provider.user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::debug!("found {} jobs for provider {}", jobs.len(), provider.id);

    Ok(Json(jobs))
}

pub async fn decide_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<DecisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let decision = Decision::parse(&body.decision).map_err(HttpError::from)?;

    let booking = app_state
        .booking_service
        .decide(
            &auth.user,
            booking_id,
            decision,
            body.amount,
            body.price_min,
            body.price_max,
        )
        .await
        .map_err(HttpError::from)?;

    Ok(Json(booking))
}

pub async fn update_location(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<LocationUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let provider = app_state
        .location_service
        .update_provider_location(&auth.user, body.lat, body.lng, body.booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(provider))
}

/// Standalone digital-id scan: verifies a provider identity with no
/// booking involved.
pub async fn verify_digital_id(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyQrDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let outcome = app_state
        .verification_service
        .verify_provider_qr(&body.qr_data)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(outcome))
}

pub async fn payout_summary(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let provider = app_state
        .db_client
        .get_provider_by_user(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Provider profile not found"))?;

    let completed = app_state
        .db_client
        .get_completed_bookings_by_provider(provider.id, provider.user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let total_earnings = completed
        .iter()
        .map(|b| b.amount.to_f64().unwrap_or(0.0))
        .sum();

    Ok(Json(ApiResponse::success(
        "Payout summary retrieved successfully",
        PayoutSummaryDto {
            total_earnings,
            jobs_completed: completed.len(),
        },
    )))
}
