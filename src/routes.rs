use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler, bookings::booking_handler, claims::claim_handler,
        customers::customer_handler, payouts::payout_handler, providers::provider_handler,
        ws::ws_handler,
    },
    middleware::auth,
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Servilink booking API is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest(
            "/providers",
            provider_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/customers",
            customer_handler().layer(middleware::from_fn(auth)),
        )
        .nest(
            "/bookings",
            booking_handler().layer(middleware::from_fn(auth)),
        )
        .nest("/claims", claim_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/payouts",
            payout_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws_handler))
        .nest("/api", api_route)
        .layer(Extension(app_state))
}
