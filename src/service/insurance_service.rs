use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, claimdb::ClaimExt, db::DBClient, profiledb::ProfileExt},
    models::{
        claimmodel::{ClaimType, InsuranceClaim},
        usermodel::User,
    },
    service::error::ServiceError,
};

/// Fixed premium added to the booking amount when the customer opts in.
pub const INSURANCE_PREMIUM: f64 = 49.0;

const COVERAGE_DETAILS: &str = "Standard Protection: Damage, Injury, Fraud";

#[derive(Debug, Clone)]
pub struct PolicyQuote {
    pub opted: bool,
    pub cost: f64,
    pub policy_id: Option<String>,
    pub coverage_details: Option<String>,
}

/// Compute insurance terms at booking creation. Policy ids only need to be
/// unique per booking; millisecond timestamp plus a random suffix keeps the
/// collision odds negligible.
pub fn quote_policy(opted: bool) -> PolicyQuote {
    if !opted {
        return PolicyQuote {
            opted: false,
            cost: 0.0,
            policy_id: None,
            coverage_details: None,
        };
    }

    let suffix: u32 = rand::rng().random_range(0..1000);
    PolicyQuote {
        opted: true,
        cost: INSURANCE_PREMIUM,
        policy_id: Some(format!(
            "INS-{}-{}",
            Utc::now().timestamp_millis(),
            suffix
        )),
        coverage_details: Some(COVERAGE_DETAILS.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct InsuranceService {
    db_client: Arc<DBClient>,
}

impl InsuranceService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Raise a claim against an insured booking. One claim per booking; the
    /// existence check runs before the insert, so two simultaneous calls
    /// can still race through the small check-then-act window.
    pub async fn create_claim(
        &self,
        customer_user: &User,
        booking_id: Uuid,
        claim_type: ClaimType,
        description: String,
        evidence_images: Vec<String>,
    ) -> Result<InsuranceClaim, ServiceError> {
        let customer = self
            .db_client
            .get_customer_by_user(customer_user.id)
            .await?
            .ok_or(ServiceError::CustomerProfileNotFound)?;

        let booking = self
            .db_client
            .get_booking_for_customer(booking_id, customer.id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if !booking.insurance_opted {
            return Err(ServiceError::Validation(
                "This booking is not insured".to_string(),
            ));
        }

        let policy_id = booking.insurance_policy_id.clone().ok_or_else(|| {
            ServiceError::Validation("Booking has no insurance policy attached".to_string())
        })?;

        if self
            .db_client
            .get_claim_by_booking(booking.id)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "A claim has already been raised for this booking".to_string(),
            ));
        }

        let claim = self
            .db_client
            .create_claim(
                booking.id,
                customer.id,
                policy_id,
                claim_type,
                ammonia::clean(&description),
                evidence_images,
            )
            .await?;

        Ok(claim)
    }

    pub async fn my_claims(
        &self,
        customer_user: &User,
    ) -> Result<Vec<InsuranceClaim>, ServiceError> {
        let customer = self
            .db_client
            .get_customer_by_user(customer_user.id)
            .await?
            .ok_or(ServiceError::CustomerProfileNotFound)?;

        Ok(self.db_client.get_claims_by_customer(customer.id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opted_quote_carries_premium_and_policy() {
        let quote = quote_policy(true);
        assert!(quote.opted);
        assert_eq!(quote.cost, INSURANCE_PREMIUM);
        let policy_id = quote.policy_id.unwrap();
        assert!(policy_id.starts_with("INS-"));
        assert_eq!(policy_id.split('-').count(), 3);
        assert_eq!(quote.coverage_details.as_deref(), Some(COVERAGE_DETAILS));
    }

    #[test]
    fn declined_quote_is_empty() {
        let quote = quote_policy(false);
        assert!(!quote.opted);
        assert_eq!(quote.cost, 0.0);
        assert!(quote.policy_id.is_none());
        assert!(quote.coverage_details.is_none());
    }

    #[test]
    fn policy_ids_differ_across_quotes() {
        // Random suffix keeps collisions negligible even within the same
        // millisecond.
        let a = quote_policy(true).policy_id.unwrap();
        let b = quote_policy(true).policy_id.unwrap();
        let c = quote_policy(true).policy_id.unwrap();
        assert!(!(a == b && b == c));
    }
}
