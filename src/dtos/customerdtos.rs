use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::profilemodel::ServicePreference;

//Customer profile DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerDto {
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    pub service_preference: Option<ServicePreference>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchProvidersQuery {
    pub service_type: Option<String>,
    pub service_area: Option<String>,
    pub company_name: Option<String>,
}
