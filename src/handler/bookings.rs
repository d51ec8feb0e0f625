use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::bookingdtos::*,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn booking_handler() -> Router {
    Router::new()
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/complete", post(complete_booking))
        .route("/:booking_id/confirm-price", post(confirm_price))
        .route("/:booking_id/generate-qr", post(generate_qr))
        .route("/verify-qr", post(verify_qr))
        .route("/:booking_id/review", post(submit_review))
}

/// Booking detail for either party (or an admin).
pub async fn get_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let (booking, customer, provider) = app_state
        .booking_service
        .get_booking_for_party(&auth.user, booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(BookingDetailDto {
        booking,
        customer,
        provider,
    }))
}

pub async fn complete_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .booking_service
        .complete(&auth.user, booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(booking))
}

pub async fn confirm_price(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<ConfirmPriceDto>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .booking_service
        .confirm_price(&auth.user, booking_id, body.accepted)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(booking))
}

pub async fn generate_qr(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let qr_data = app_state
        .verification_service
        .generate_booking_qr(&auth.user, booking_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(QrDataResponseDto { qr_data }))
}

/// Booking-scoped QR scan by the customer on site.
pub async fn verify_qr(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<VerifyQrDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let outcome = app_state
        .verification_service
        .verify_booking_qr(&body.qr_data)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(outcome))
}

pub async fn submit_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<SubmitReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .booking_service
        .submit_review(
            &auth.user,
            booking_id,
            body.rating,
            body.review.unwrap_or_default(),
        )
        .await
        .map_err(HttpError::from)?;

    Ok(Json(ApiResponse::success(
        "Review submitted successfully",
        booking,
    )))
}
