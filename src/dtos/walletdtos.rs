use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{
    bookingmodel::{Booking, PaymentMethod},
    walletmodel::WalletTransaction,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct PayBookingDto {
    pub amount: Option<f64>,
    pub method: Option<PaymentMethod>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AmountDto {
    #[validate(range(min = 0.01, message = "Invalid amount"))]
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct PaymentResultDto {
    pub booking: Booking,
    pub wallet_transaction: Option<WalletTransaction>,
}
