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
    dtos::walletdtos::{AmountDto, PayBookingDto, PaymentResultDto},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::bookingmodel::PaymentMethod,
    AppState,
};

pub fn payout_handler() -> Router {
    Router::new()
        .route("/wallet", get(wallet_transactions))
        .route("/wallet/booking/:booking_id/pay", post(pay_booking))
        .route("/wallet/deposit", post(deposit))
        .route("/wallet/withdraw", post(withdraw))
        .route("/wallet/payout", post(payout))
}

pub async fn wallet_transactions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let txs = app_state
        .wallet_service
        .transactions(&auth.user)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(txs))
}

pub async fn pay_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<PayBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (booking, wallet_transaction) = app_state
        .wallet_service
        .record_booking_payment(
            &auth.user,
            booking_id,
            body.method.unwrap_or(PaymentMethod::Offline),
            body.amount,
        )
        .await
        .map_err(HttpError::from)?;

    Ok(Json(PaymentResultDto {
        booking,
        wallet_transaction,
    }))
}

pub async fn deposit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AmountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let tx = app_state
        .wallet_service
        .deposit(&auth.user, body.amount)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(tx))
}

pub async fn withdraw(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AmountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let tx = app_state
        .wallet_service
        .withdraw(&auth.user, body.amount)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(tx))
}

pub async fn payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<AmountDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let tx = app_state
        .wallet_service
        .payout(&auth.user, body.amount)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(tx))
}
