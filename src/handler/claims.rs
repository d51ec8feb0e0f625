use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::claimdtos::CreateClaimDto, error::HttpError, middleware::JWTAuthMiddeware, AppState,
};

pub fn claim_handler() -> Router {
    Router::new()
        .route("/", post(create_claim))
        .route("/my-claims", get(my_claims))
        .layer(axum::middleware::from_fn(crate::middleware::require_customer))
}

pub async fn create_claim(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateClaimDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let claim = app_state
        .insurance_service
        .create_claim(
            &auth.user,
            body.booking_id,
            body.claim_type,
            body.description,
            body.evidence_images.unwrap_or_default(),
        )
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(claim)))
}

pub async fn my_claims(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let claims = app_state
        .insurance_service
        .my_claims(&auth.user)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(claims))
}
