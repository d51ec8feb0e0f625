use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

//Provider profile DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateProviderDto {
    #[validate(range(min = 18, max = 100, message = "Age must be between 18 and 100"))]
    pub age: Option<i32>,

    pub service_type: Option<String>,
    pub specialization: Option<String>,
    pub identity_proof: Option<String>,
    pub service_area: Option<String>,
    pub available_timings: Option<String>,

    #[validate(range(min = 0, max = 60, message = "Experience must be between 0 and 60 years"))]
    pub experience_years: Option<i32>,

    pub emergency_service: Option<bool>,
}

/// Location sample pushed by either party. The booking id scopes the
/// rebroadcast to that booking's room.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LocationUpdateDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub lng: f64,

    pub booking_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PayoutSummaryDto {
    pub total_earnings: f64,
    pub jobs_completed: usize,
}
