use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use validator::Validate;

use crate::{
    db::{profiledb::ProfileExt, userdb::UserExt},
    dtos::authdtos::*,
    error::{ErrorMessage, HttpError},
    middleware::extract_token,
    models::{profilemodel::ServicePreference, usermodel::UserRole},
    utils::{chain, password, token},
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/register/provider", post(register_provider))
        .route("/register/customer", post(register_customer))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub async fn register_provider(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterProviderDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_user(None, Some(&body.mobile_number))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::MobileExist.to_string()));
    }

    let password_hash =
        password::hash(&body.password).map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(
            body.full_name,
            body.mobile_number,
            password_hash,
            UserRole::Provider,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    // Provider profile + mock chain identity
    let chain_identity = chain::create_provider_identity(user.id);

    let provider = app_state
        .db_client
        .create_provider(
            user.id,
            body.age,
            body.service_type,
            body.specialization.unwrap_or_default(),
            body.identity_proof.unwrap_or_default(),
            body.service_area,
            body.available_timings,
            body.experience_years.unwrap_or(0),
            chain_identity,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage * 60,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponseDto {
            token,
            user: PublicUserDto::from(&user),
            provider: Some(provider),
            customer: None,
        }),
    ))
}

pub async fn register_customer(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterCustomerDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing = app_state
        .db_client
        .get_user(None, Some(&body.mobile_number))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    if existing.is_some() {
        return Err(HttpError::bad_request(ErrorMessage::MobileExist.to_string()));
    }

    let password_hash =
        password::hash(&body.password).map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(
            body.full_name,
            body.mobile_number,
            password_hash,
            UserRole::Customer,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let customer = app_state
        .db_client
        .create_customer(
            user.id,
            body.email.unwrap_or_default(),
            body.service_preference.unwrap_or(ServicePreference::Home),
            body.address,
            body.lat,
            body.lng,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage * 60,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponseDto {
            token,
            user: PublicUserDto::from(&user),
            provider: None,
            customer: Some(customer),
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.mobile_number))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password_hash)
        .map_err(|_| HttpError::unauthorized(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::unauthorized(
            ErrorMessage::WrongCredentials.to_string(),
        ));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage * 60,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let provider = app_state
        .db_client
        .get_provider_by_user(user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;
    let customer = app_state
        .db_client
        .get_customer_by_user(user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(time::Duration::minutes(app_state.env.jwt_maxage))
        .http_only(true)
        .build();

    let mut response = Json(AuthResponseDto {
        token,
        user: PublicUserDto::from(&user),
        provider,
        customer,
    })
    .into_response();

    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    );

    Ok(response)
}

/// Logout blacklists the presented token until its natural expiry. Without
/// Redis configured this degrades to a client-side logout.
pub async fn logout(
    cookie_jar: CookieJar,
    Extension(app_state): Extension<Arc<AppState>>,
    req: Request,
) -> Result<impl IntoResponse, HttpError> {
    let token = extract_token(&cookie_jar, &req)
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    token::decode_token(token.clone(), app_state.env.jwt_secret.as_bytes())?;

    app_state
        .db_client
        .blacklist_token(&token, app_state.env.jwt_maxage * 60)
        .await
        .map_err(HttpError::server_error)?;

    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::minutes(-1))
        .http_only(true)
        .build();

    let mut response = Json(serde_json::json!({
        "status": "success",
        "message": "Logged out"
    }))
    .into_response();

    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| HttpError::server_error(e.to_string()))?,
    );

    Ok(response)
}
