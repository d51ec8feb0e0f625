use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    bookingmodel::Booking,
    profilemodel::{Customer, Provider},
};

//Booking DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBookingDto {
    pub provider_id: Uuid,

    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,

    pub service_type: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,

    #[validate(range(min = 0.0, message = "Amount must not be negative"))]
    pub amount: Option<f64>,

    pub insurance_opted: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct DecisionDto {
    #[validate(length(min = 1, message = "Decision is required"))]
    pub decision: String, // "accept" or "reject"

    pub amount: Option<f64>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmPriceDto {
    pub accepted: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitReviewDto {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    #[validate(length(max = 1000, message = "Review must be at most 1000 characters"))]
    pub review: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct VerifyQrDto {
    #[validate(length(min = 1, message = "Missing qrData"))]
    pub qr_data: String,
}

#[derive(Debug, Serialize)]
pub struct QrDataResponseDto {
    pub qr_data: String,
}

#[derive(Debug, Serialize)]
pub struct BookingDetailDto {
    pub booking: Booking,
    pub customer: Option<Customer>,
    pub provider: Option<Provider>,
}

//Response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> ApiResponse<()> {
        ApiResponse {
            status: "error".to_string(),
            message: message.to_string(),
            data: None,
        }
    }
}
