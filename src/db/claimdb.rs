use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::claimmodel::{ClaimType, InsuranceClaim};

const CLAIM_COLUMNS: &str = r#"
    id, booking_id, customer_id, policy_id, claim_type, description,
    evidence_images, status, admin_comments, refund_amount,
    created_at, updated_at
"#;

#[async_trait]
pub trait ClaimExt {
    async fn create_claim(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
        policy_id: String,
        claim_type: ClaimType,
        description: String,
        evidence_images: Vec<String>,
    ) -> Result<InsuranceClaim, sqlx::Error>;

    async fn get_claim_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<InsuranceClaim>, sqlx::Error>;

    async fn get_claims_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<InsuranceClaim>, sqlx::Error>;
}

#[async_trait]
impl ClaimExt for DBClient {
    async fn create_claim(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
        policy_id: String,
        claim_type: ClaimType,
        description: String,
        evidence_images: Vec<String>,
    ) -> Result<InsuranceClaim, sqlx::Error> {
        sqlx::query_as::<_, InsuranceClaim>(&format!(
            r#"
            INSERT INTO insurance_claims
            (booking_id, customer_id, policy_id, claim_type, description, evidence_images)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CLAIM_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(customer_id)
        .bind(policy_id)
        .bind(claim_type)
        .bind(description)
        .bind(Json(evidence_images))
        .fetch_one(&self.pool)
        .await
    }

    async fn get_claim_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<InsuranceClaim>, sqlx::Error> {
        sqlx::query_as::<_, InsuranceClaim>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM insurance_claims WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_claims_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<InsuranceClaim>, sqlx::Error> {
        sqlx::query_as::<_, InsuranceClaim>(&format!(
            r#"
            SELECT {CLAIM_COLUMNS} FROM insurance_claims
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
    }
}
