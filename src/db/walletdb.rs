use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::walletmodel::{TxDirection, TxStatus, WalletTransaction};

const WALLET_TX_COLUMNS: &str = r#"
    id, user_id, booking_id, direction, amount, chain_tx_hash, status,
    description, created_at
"#;

#[async_trait]
pub trait WalletExt {
    async fn create_wallet_transaction(
        &self,
        user_id: Uuid,
        booking_id: Option<Uuid>,
        direction: TxDirection,
        amount: BigDecimal,
        chain_tx_hash: Option<String>,
        status: TxStatus,
        description: Option<String>,
    ) -> Result<WalletTransaction, sqlx::Error>;

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error>;
}

#[async_trait]
impl WalletExt for DBClient {
    async fn create_wallet_transaction(
        &self,
        user_id: Uuid,
        booking_id: Option<Uuid>,
        direction: TxDirection,
        amount: BigDecimal,
        chain_tx_hash: Option<String>,
        status: TxStatus,
        description: Option<String>,
    ) -> Result<WalletTransaction, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            INSERT INTO wallet_transactions
            (user_id, booking_id, direction, amount, chain_tx_hash, status, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {WALLET_TX_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(booking_id)
        .bind(direction)
        .bind(amount)
        .bind(chain_tx_hash)
        .bind(status)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            r#"
            SELECT {WALLET_TX_COLUMNS} FROM wallet_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
