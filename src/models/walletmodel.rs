use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "tx_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TxDirection {
    In,
    Out,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "tx_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Append-only ledger entry. The wallet balance is never stored; it is
/// always the signed fold over a user's transactions.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub direction: TxDirection,
    pub amount: BigDecimal,
    pub chain_tx_hash: Option<String>,
    pub status: TxStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Signed sum over a user's ledger: credits add, debits subtract.
pub fn wallet_balance(transactions: &[WalletTransaction]) -> BigDecimal {
    transactions
        .iter()
        .fold(BigDecimal::from(0), |sum, tx| match tx.direction {
            TxDirection::In => sum + &tx.amount,
            TxDirection::Out => sum - &tx.amount,
        })
}

/// Debit guard: an `out` entry may only be recorded when the derived
/// balance before it covers the amount.
pub fn can_debit(balance: &BigDecimal, amount: &BigDecimal) -> bool {
    balance >= amount
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(direction: TxDirection, amount: i64) -> WalletTransaction {
        WalletTransaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            booking_id: None,
            direction,
            amount: BigDecimal::from(amount),
            chain_tx_hash: None,
            status: TxStatus::Confirmed,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn balance_is_signed_sum() {
        let txs = vec![
            tx(TxDirection::In, 500),
            tx(TxDirection::In, 250),
            tx(TxDirection::Out, 100),
        ];
        assert_eq!(wallet_balance(&txs), BigDecimal::from(650));
    }

    #[test]
    fn empty_ledger_balance_is_zero() {
        assert_eq!(wallet_balance(&[]), BigDecimal::from(0));
    }

    #[test]
    fn debits_can_drive_balance_negative_in_the_fold() {
        // The guard against overdrafts lives in the wallet service, not in
        // the fold itself.
        let txs = vec![tx(TxDirection::In, 100), tx(TxDirection::Out, 300)];
        assert_eq!(wallet_balance(&txs), BigDecimal::from(-200));
    }

    #[test]
    fn debit_guard_requires_covering_balance() {
        assert!(can_debit(&BigDecimal::from(500), &BigDecimal::from(500)));
        assert!(can_debit(&BigDecimal::from(501), &BigDecimal::from(500)));
        assert!(!can_debit(&BigDecimal::from(499), &BigDecimal::from(500)));
    }
}
