use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::claimmodel::ClaimType;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateClaimDto {
    pub booking_id: Uuid,

    pub claim_type: ClaimType,

    #[validate(length(min = 10, max = 2000, message = "Description must be between 10 and 2000 characters"))]
    pub description: String,

    pub evidence_images: Option<Vec<String>>,
}
