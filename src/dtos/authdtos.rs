use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    profilemodel::{Customer, Provider, ServicePreference},
    usermodel::{User, UserRole},
};

//Registration DTOs
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterProviderDto {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(range(min = 18, max = 100, message = "Age must be between 18 and 100"))]
    pub age: i32,

    #[validate(length(min = 6, max = 20, message = "Mobile number must be between 6 and 20 digits"))]
    pub mobile_number: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, message = "Service type is required"))]
    pub service_type: String,

    pub specialization: Option<String>,
    pub identity_proof: Option<String>,

    #[validate(length(min = 1, message = "Service area is required"))]
    pub service_area: String,

    #[validate(length(min = 1, message = "Available timings are required"))]
    pub available_timings: String,

    pub experience_years: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterCustomerDto {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 6, max = 20, message = "Mobile number must be between 6 and 20 digits"))]
    pub mobile_number: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    pub service_preference: Option<ServicePreference>,

    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,

    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginDto {
    #[validate(length(min = 1, message = "Mobile number is required"))]
    pub mobile_number: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

//Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUserDto {
    pub id: Uuid,
    pub full_name: String,
    pub mobile_number: String,
    pub role: UserRole,
}

impl From<&User> for PublicUserDto {
    fn from(user: &User) -> Self {
        PublicUserDto {
            id: user.id,
            full_name: user.full_name.clone(),
            mobile_number: user.mobile_number.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponseDto {
    pub token: String,
    pub user: PublicUserDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
}
