mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    booking_service::BookingService, events::EventBroadcaster,
    insurance_service::InsuranceService, location_service::LocationService,
    verification_service::VerificationService, wallet_service::WalletService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub events: Arc<EventBroadcaster>,
    // Services
    pub booking_service: Arc<BookingService>,
    pub verification_service: Arc<VerificationService>,
    pub location_service: Arc<LocationService>,
    pub insurance_service: Arc<InsuranceService>,
    pub wallet_service: Arc<WalletService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);
        let events = Arc::new(EventBroadcaster::new());

        let booking_service = Arc::new(BookingService::new(
            db_client_arc.clone(),
            events.clone(),
        ));
        let verification_service = Arc::new(VerificationService::new(db_client_arc.clone()));
        let location_service = Arc::new(LocationService::new(
            db_client_arc.clone(),
            events.clone(),
        ));
        let insurance_service = Arc::new(InsuranceService::new(db_client_arc.clone()));
        let wallet_service = Arc::new(WalletService::new(db_client_arc.clone()));

        Self {
            env: config,
            db_client: db_client_arc,
            events,
            booking_service,
            verification_service,
            location_service,
            insurance_service,
            wallet_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            println!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            println!("🔥 Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        println!("🔥 Failed to run database migrations: {:?}", err);
        std::process::exit(1);
    }

    let db_client = if let Some(ref redis_url) = config.redis_url {
        let client = DBClient::with_redis(pool.clone(), redis_url).await;
        if client.is_redis_available() {
            println!("✅ Redis connected - token revocation is ACTIVE");
        } else {
            println!("⚠️  Redis unavailable - running without token revocation");
        }
        client
    } else {
        println!("ℹ️  Redis not configured - running without token revocation (set REDIS_URL to enable)");
        DBClient::new(pool)
    };

    let allowed_origins = vec![
        config.frontend_url.parse::<HeaderValue>().unwrap(),
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state.clone()).layer(cors);

    println!("🚀 Server is running on http://localhost:{}", config.port);
    println!("🔌 WebSocket endpoint ready on /ws");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
