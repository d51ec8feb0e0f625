use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usermodel::{User, UserRole};

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        mobile_number: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        full_name: T,
        mobile_number: T,
        password_hash: T,
        role: UserRole,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        mobile_number: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, mobile_number, password_hash, role, created_at, updated_at
            FROM users
            WHERE ($1::UUID IS NULL OR id = $1)
              AND ($2::VARCHAR IS NULL OR mobile_number = $2)
            "#,
        )
        .bind(user_id)
        .bind(mobile_number)
        .fetch_optional(&self.pool)
        .await
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        full_name: T,
        mobile_number: T,
        password_hash: T,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, mobile_number, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, mobile_number, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(full_name.into())
        .bind(mobile_number.into())
        .bind(password_hash.into())
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }
}
