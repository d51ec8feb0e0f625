use redis::aio::ConnectionManager;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
    pub redis_client: Option<Arc<Mutex<ConnectionManager>>>,
}

impl std::fmt::Debug for DBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DBClient")
            .field("pool", &"Pool<Postgres>")
            .field("redis_client", &self.redis_client.is_some())
            .finish()
    }
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient {
            pool,
            redis_client: None,
        }
    }

    /// Connect Redis alongside PostgreSQL. Redis failures are non-fatal:
    /// the token blacklist degrades to a no-op without it.
    pub async fn with_redis(pool: Pool<Postgres>, redis_url: &str) -> Self {
        match redis::Client::open(redis_url) {
            Ok(client) => match ConnectionManager::new(client).await {
                Ok(conn) => {
                    tracing::info!("Redis connection established");
                    DBClient {
                        pool,
                        redis_client: Some(Arc::new(Mutex::new(conn))),
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to connect to Redis: {}. Continuing without it.", e);
                    DBClient::new(pool)
                }
            },
            Err(e) => {
                tracing::warn!("Failed to create Redis client: {}. Continuing without it.", e);
                DBClient::new(pool)
            }
        }
    }

    pub fn is_redis_available(&self) -> bool {
        self.redis_client.is_some()
    }

    /// Revoke a bearer token until its natural expiry.
    pub async fn blacklist_token(&self, token: &str, ttl_seconds: i64) -> Result<(), String> {
        let Some(redis_client) = &self.redis_client else {
            return Ok(());
        };

        let key = format!("token_blacklist:{}", token);
        let mut conn = redis_client.lock().await;
        redis::cmd("SET")
            .arg(&key)
            .arg("revoked")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<_, ()>(&mut *conn)
            .await
            .map_err(|e| e.to_string())
    }

    pub async fn is_token_blacklisted(&self, token: &str) -> bool {
        let Some(redis_client) = &self.redis_client else {
            return false;
        };

        let key = format!("token_blacklist:{}", token);
        let mut conn = redis_client.lock().await;
        redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut *conn)
            .await
            .unwrap_or(false)
    }
}
