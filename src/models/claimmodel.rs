use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "claim_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Damage,
    Injury,
    Delay,
    Fraud,
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "claim_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Reviewing,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct InsuranceClaim {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub customer_id: Uuid,
    pub policy_id: String,
    pub claim_type: ClaimType,
    pub description: String,
    pub evidence_images: Json<Vec<String>>,
    pub status: ClaimStatus,
    pub admin_comments: Option<String>,
    pub refund_amount: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
