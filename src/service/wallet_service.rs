use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, db::DBClient, profiledb::ProfileExt, walletdb::WalletExt},
    models::{
        bookingmodel::{Booking, PaymentMethod},
        usermodel::User,
        walletmodel::{can_debit, wallet_balance, TxDirection, TxStatus, WalletTransaction},
    },
    service::error::ServiceError,
    utils::chain,
};

#[derive(Debug, Clone)]
pub struct WalletService {
    db_client: Arc<DBClient>,
}

impl WalletService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn transactions(
        &self,
        user: &User,
    ) -> Result<Vec<WalletTransaction>, ServiceError> {
        Ok(self.db_client.get_wallet_transactions(user.id).await?)
    }

    /// Mark a booking paid. Settlement through the mock chain only happens
    /// for the blockchain method, which credits the provider's wallet.
    /// Either party may trigger payment; a production rollout would
    /// tighten this.
    pub async fn record_booking_payment(
        &self,
        _user: &User,
        booking_id: Uuid,
        method: PaymentMethod,
        amount: Option<f64>,
    ) -> Result<(Booking, Option<WalletTransaction>), ServiceError> {
        let booking = self
            .db_client
            .get_booking(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        let amount = match amount {
            Some(a) if a > 0.0 => BigDecimal::try_from(a)
                .map_err(|_| ServiceError::Validation("Invalid amount".to_string()))?,
            Some(_) => {
                return Err(ServiceError::Validation("Invalid amount".to_string()));
            }
            None => booking.amount.clone(),
        };

        let booking = self
            .db_client
            .record_payment(booking_id, method, amount.clone())
            .await?;

        let tx_record = if method == PaymentMethod::Blockchain {
            let provider = self
                .db_client
                .resolve_provider(booking.provider_id)
                .await?
                .ok_or(ServiceError::ProviderNotFound)?;

            let receipt = chain::record_wallet_transaction_on_chain(
                provider.user_id,
                Some(booking.id),
                amount.to_f64().unwrap_or(0.0),
                TxDirection::In,
            );

            Some(
                self.db_client
                    .create_wallet_transaction(
                        provider.user_id,
                        Some(booking.id),
                        TxDirection::In,
                        amount,
                        Some(receipt.tx_hash),
                        TxStatus::Confirmed,
                        None,
                    )
                    .await?,
            )
        } else {
            None
        };

        Ok((booking, tx_record))
    }

    pub async fn deposit(
        &self,
        user: &User,
        amount: f64,
    ) -> Result<WalletTransaction, ServiceError> {
        let amount = Self::positive_amount(amount)?;

        Ok(self
            .db_client
            .create_wallet_transaction(
                user.id,
                None,
                TxDirection::In,
                amount,
                None,
                TxStatus::Confirmed,
                Some("Deposit via Bank Transfer".to_string()),
            )
            .await?)
    }

    pub async fn withdraw(
        &self,
        user: &User,
        amount: f64,
    ) -> Result<WalletTransaction, ServiceError> {
        self.debit(user, amount, "Withdrawal to Bank Account").await
    }

    pub async fn payout(
        &self,
        user: &User,
        amount: f64,
    ) -> Result<WalletTransaction, ServiceError> {
        self.debit(user, amount, "Payout Request Processed").await
    }

    async fn debit(
        &self,
        user: &User,
        amount: f64,
        description: &str,
    ) -> Result<WalletTransaction, ServiceError> {
        let amount = Self::positive_amount(amount)?;

        let txs = self.db_client.get_wallet_transactions(user.id).await?;
        let balance = wallet_balance(&txs);
        if !can_debit(&balance, &amount) {
            return Err(ServiceError::Validation(
                "Insufficient balance".to_string(),
            ));
        }

        Ok(self
            .db_client
            .create_wallet_transaction(
                user.id,
                None,
                TxDirection::Out,
                amount,
                None,
                TxStatus::Confirmed,
                Some(description.to_string()),
            )
            .await?)
    }

    fn positive_amount(amount: f64) -> Result<BigDecimal, ServiceError> {
        if amount <= 0.0 {
            return Err(ServiceError::Validation("Invalid amount".to_string()));
        }
        BigDecimal::try_from(amount)
            .map_err(|_| ServiceError::Validation("Invalid amount".to_string()))
    }
}
