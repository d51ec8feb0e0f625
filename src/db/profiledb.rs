use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::profilemodel::{Customer, Provider, ServicePreference};

const PROVIDER_COLUMNS: &str = r#"
    id, user_id, age, service_type, specialization, identity_proof,
    service_area, available_timings, experience_years, rating, rating_count,
    total_jobs, chain_identity, emergency_service, current_lat, current_lng,
    created_at, updated_at
"#;

const CUSTOMER_COLUMNS: &str = r#"
    id, user_id, email, service_preference, address, lat, lng,
    created_at, updated_at
"#;

#[async_trait]
pub trait ProfileExt {
    async fn create_provider(
        &self,
        user_id: Uuid,
        age: i32,
        service_type: String,
        specialization: String,
        identity_proof: String,
        service_area: String,
        available_timings: String,
        experience_years: i32,
        chain_identity: String,
    ) -> Result<Provider, sqlx::Error>;

    async fn get_provider_by_user(&self, user_id: Uuid) -> Result<Option<Provider>, sqlx::Error>;

    async fn get_provider_by_id(&self, provider_id: Uuid)
        -> Result<Option<Provider>, sqlx::Error>;

    /// Resolve a provider from a reference that may be either the profile
    /// id or the owning user's id.
    async fn resolve_provider(&self, reference: Uuid) -> Result<Option<Provider>, sqlx::Error>;

    async fn get_provider_by_chain_identity(
        &self,
        chain_identity: &str,
    ) -> Result<Option<Provider>, sqlx::Error>;

    async fn update_provider_profile(
        &self,
        user_id: Uuid,
        age: Option<i32>,
        service_type: Option<String>,
        specialization: Option<String>,
        identity_proof: Option<String>,
        service_area: Option<String>,
        available_timings: Option<String>,
        experience_years: Option<i32>,
        emergency_service: Option<bool>,
    ) -> Result<Option<Provider>, sqlx::Error>;

    async fn update_provider_location(
        &self,
        user_id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Provider>, sqlx::Error>;

    /// Guarded write of the running rating average. The update only lands
    /// when rating_count still matches the value the caller computed from;
    /// a None result means another review got there first and the caller
    /// should re-read and retry.
    async fn try_apply_provider_rating(
        &self,
        provider_id: Uuid,
        expected_count: i32,
        new_rating: f64,
        new_count: i32,
    ) -> Result<Option<Provider>, sqlx::Error>;

    async fn search_providers(
        &self,
        service_type: Option<&str>,
        service_area: Option<&str>,
    ) -> Result<Vec<Provider>, sqlx::Error>;

    async fn create_customer(
        &self,
        user_id: Uuid,
        email: String,
        service_preference: ServicePreference,
        address: String,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Customer, sqlx::Error>;

    async fn get_customer_by_user(&self, user_id: Uuid) -> Result<Option<Customer>, sqlx::Error>;

    async fn get_customer_by_id(&self, customer_id: Uuid)
        -> Result<Option<Customer>, sqlx::Error>;

    async fn update_customer_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        service_preference: Option<ServicePreference>,
        address: Option<String>,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Option<Customer>, sqlx::Error>;

    async fn update_customer_location(
        &self,
        user_id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Customer>, sqlx::Error>;
}

#[async_trait]
impl ProfileExt for DBClient {
    async fn create_provider(
        &self,
        user_id: Uuid,
        age: i32,
        service_type: String,
        specialization: String,
        identity_proof: String,
        service_area: String,
        available_timings: String,
        experience_years: i32,
        chain_identity: String,
    ) -> Result<Provider, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            r#"
            INSERT INTO providers
            (user_id, age, service_type, specialization, identity_proof,
             service_area, available_timings, experience_years, chain_identity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(age)
        .bind(service_type)
        .bind(specialization)
        .bind(identity_proof)
        .bind(service_area)
        .bind(available_timings)
        .bind(experience_years)
        .bind(chain_identity)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_provider_by_user(&self, user_id: Uuid) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_provider_by_id(
        &self,
        provider_id: Uuid,
    ) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1"
        ))
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn resolve_provider(&self, reference: Uuid) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = $1 OR user_id = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_provider_by_chain_identity(
        &self,
        chain_identity: &str,
    ) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE chain_identity = $1"
        ))
        .bind(chain_identity)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_provider_profile(
        &self,
        user_id: Uuid,
        age: Option<i32>,
        service_type: Option<String>,
        specialization: Option<String>,
        identity_proof: Option<String>,
        service_area: Option<String>,
        available_timings: Option<String>,
        experience_years: Option<i32>,
        emergency_service: Option<bool>,
    ) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            r#"
            UPDATE providers
            SET age = COALESCE($2, age),
                service_type = COALESCE($3, service_type),
                specialization = COALESCE($4, specialization),
                identity_proof = COALESCE($5, identity_proof),
                service_area = COALESCE($6, service_area),
                available_timings = COALESCE($7, available_timings),
                experience_years = COALESCE($8, experience_years),
                emergency_service = COALESCE($9, emergency_service),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(age)
        .bind(service_type)
        .bind(specialization)
        .bind(identity_proof)
        .bind(service_area)
        .bind(available_timings)
        .bind(experience_years)
        .bind(emergency_service)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_provider_location(
        &self,
        user_id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            r#"
            UPDATE providers
            SET current_lat = $2, current_lng = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(lat)
        .bind(lng)
        .fetch_optional(&self.pool)
        .await
    }

    async fn try_apply_provider_rating(
        &self,
        provider_id: Uuid,
        expected_count: i32,
        new_rating: f64,
        new_count: i32,
    ) -> Result<Option<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            r#"
            UPDATE providers
            SET rating = $3,
                rating_count = $4,
                updated_at = NOW()
            WHERE id = $1 AND rating_count = $2
            RETURNING {PROVIDER_COLUMNS}
            "#
        ))
        .bind(provider_id)
        .bind(expected_count)
        .bind(new_rating)
        .bind(new_count)
        .fetch_optional(&self.pool)
        .await
    }

    async fn search_providers(
        &self,
        service_type: Option<&str>,
        service_area: Option<&str>,
    ) -> Result<Vec<Provider>, sqlx::Error> {
        sqlx::query_as::<_, Provider>(&format!(
            r#"
            SELECT {PROVIDER_COLUMNS}
            FROM providers
            WHERE ($1::VARCHAR IS NULL OR service_type = $1)
              AND ($2::VARCHAR IS NULL OR service_area ILIKE '%' || $2 || '%')
            ORDER BY rating DESC, total_jobs DESC
            "#
        ))
        .bind(service_type)
        .bind(service_area)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_customer(
        &self,
        user_id: Uuid,
        email: String,
        service_preference: ServicePreference,
        address: String,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (user_id, email, service_preference, address, lat, lng)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(email)
        .bind(service_preference)
        .bind(address)
        .bind(lat)
        .bind(lng)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_customer_by_user(&self, user_id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_customer_by_id(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_customer_profile(
        &self,
        user_id: Uuid,
        email: Option<String>,
        service_preference: Option<ServicePreference>,
        address: Option<String>,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET email = COALESCE($2, email),
                service_preference = COALESCE($3, service_preference),
                address = COALESCE($4, address),
                lat = COALESCE($5, lat),
                lng = COALESCE($6, lng),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(email)
        .bind(service_preference)
        .bind(address)
        .bind(lat)
        .bind(lng)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_customer_location(
        &self,
        user_id: Uuid,
        lat: f64,
        lng: f64,
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET lat = $2, lng = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(lat)
        .bind(lng)
        .fetch_optional(&self.pool)
        .await
    }
}
