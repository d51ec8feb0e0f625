use std::sync::Arc;

use bigdecimal::BigDecimal;
use num_traits::ToPrimitive;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, db::DBClient, profiledb::ProfileExt},
    models::{
        bookingmodel::{Booking, BookingStatus},
        profilemodel::{Customer, Provider},
        usermodel::User,
    },
    service::{
        error::ServiceError,
        events::{booking_room, user_room, EventBroadcaster},
        insurance_service::quote_policy,
        pricing,
    },
};

/// Maximum optimistic retries when two reviews race on the same provider.
const RATING_RETRY_LIMIT: u32 = 5;

/// The booking lifecycle state machine. Every transition validates all of
/// its guards, writes the store, and only then notifies the counterparty;
/// a failed event publish after a durable write is non-fatal.
#[derive(Debug, Clone)]
pub struct BookingService {
    db_client: Arc<DBClient>,
    events: Arc<EventBroadcaster>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn parse(raw: &str) -> Result<Decision, ServiceError> {
        match raw {
            "accept" => Ok(Decision::Accept),
            "reject" => Ok(Decision::Reject),
            _ => Err(ServiceError::Validation("Invalid decision".to_string())),
        }
    }
}

/// newAvg = oldAvg + (rating - oldAvg) / newCount. The incremental form is
/// what keeps concurrent updates well-behaved; do not replace it with a
/// re-sum over all reviews.
pub fn next_rating_average(old_avg: f64, old_count: i32, rating: i32) -> (f64, i32) {
    let new_count = old_count + 1;
    let new_avg = old_avg + (rating as f64 - old_avg) / new_count as f64;
    (new_avg, new_count)
}

fn ensure_transition(booking: &Booking, next: BookingStatus) -> Result<(), ServiceError> {
    if !booking.status.can_transition_to(next) {
        return Err(ServiceError::Validation(format!(
            "Booking cannot move from {} to {}",
            booking.status.to_str(),
            next.to_str()
        )));
    }
    Ok(())
}

impl BookingService {
    pub fn new(db_client: Arc<DBClient>, events: Arc<EventBroadcaster>) -> Self {
        Self { db_client, events }
    }

    /// Customer requests a service. The provider reference is normalized:
    /// it may arrive as a Provider id or as the owning User id.
    pub async fn create_booking(
        &self,
        customer_user: &User,
        provider_reference: Uuid,
        service_type: Option<String>,
        description: String,
        scheduled_time: Option<chrono::DateTime<Utc>>,
        amount: Option<f64>,
        insurance_opted: bool,
    ) -> Result<Booking, ServiceError> {
        let customer = self
            .db_client
            .get_customer_by_user(customer_user.id)
            .await?
            .ok_or(ServiceError::CustomerProfileNotFound)?;

        let provider = self
            .db_client
            .resolve_provider(provider_reference)
            .await?
            .ok_or(ServiceError::ProviderNotFound)?;

        let description = ammonia::clean(&description);
        let base_amount = amount.unwrap_or(0.0);
        if base_amount < 0.0 {
            return Err(ServiceError::Validation(
                "amount cannot be negative".to_string(),
            ));
        }

        let quote = quote_policy(insurance_opted);
        let final_amount = BigDecimal::try_from(base_amount + quote.cost)
            .map_err(|_| ServiceError::Validation("invalid amount".to_string()))?;

        let booking = self
            .db_client
            .create_booking(
                customer.id,
                provider.id,
                service_type,
                description,
                scheduled_time,
                final_amount,
                quote.opted,
                BigDecimal::try_from(quote.cost).unwrap_or_else(|_| BigDecimal::from(0)),
                quote.policy_id,
                quote.coverage_details,
            )
            .await?;

        self.events
            .publish(
                &user_room(provider.user_id),
                "booking:new-request",
                json!({
                    "booking_id": booking.id,
                    "customer_id": customer.id,
                    "description": booking.description,
                    "service_type": booking.service_type,
                    "amount": booking.amount.to_f64(),
                    "timestamp": Utc::now(),
                }),
            )
            .await;

        Ok(booking)
    }

    /// Provider accepts or rejects a pending request, optionally quoting a
    /// point amount or a price range.
    pub async fn decide(
        &self,
        provider_user: &User,
        booking_id: Uuid,
        decision: Decision,
        amount: Option<f64>,
        price_min: Option<f64>,
        price_max: Option<f64>,
    ) -> Result<Booking, ServiceError> {
        let provider = self
            .db_client
            .get_provider_by_user(provider_user.id)
            .await?
            .ok_or(ServiceError::ProviderProfileNotFound)?;

        let mut booking = self
            .db_client
            .get_booking_for_provider(booking_id, provider.id, provider.user_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        let booking = match decision {
            Decision::Accept => {
                ensure_transition(&booking, BookingStatus::Accepted)?;
                let offer = pricing::parse_offer(amount, price_min, price_max)?;
                pricing::apply_acceptance(&mut booking, offer.as_ref());
                self.db_client.save_negotiation(&booking).await?
            }
            Decision::Reject => {
                ensure_transition(&booking, BookingStatus::Rejected)?;
                self.db_client
                    .update_status(booking_id, BookingStatus::Rejected)
                    .await?
            }
        };

        self.events
            .publish(
                &booking_room(booking_id),
                "booking:status-changed",
                json!({
                    "booking_id": booking_id,
                    "status": booking.status,
                    "timestamp": Utc::now(),
                }),
            )
            .await;

        self.notify_customer_of_decision(&booking).await;

        Ok(booking)
    }

    async fn notify_customer_of_decision(&self, booking: &Booking) {
        let customer_user_id = match self.customer_user_id(booking.customer_id).await {
            Some(id) => id,
            None => return,
        };

        let mut message = format!("Booking {} by provider", booking.status.to_str());
        if let (Some(min), Some(max)) = (&booking.price_min, &booking.price_max) {
            message += &format!(" with price range ₹{} - ₹{}", min, max);
        } else if booking.amount.to_f64().unwrap_or(0.0) > 0.0 {
            message += &format!(" for ₹{}", booking.amount);
        }

        self.events
            .publish(
                &user_room(customer_user_id),
                "booking:notification",
                json!({
                    "booking_id": booking.id,
                    "status": booking.status,
                    "message": message,
                    "amount": booking.amount.to_f64(),
                    "price_range": booking.price_min.as_ref().zip(booking.price_max.as_ref())
                        .map(|(min, max)| json!({"min": min.to_f64(), "max": max.to_f64()})),
                    "timestamp": Utc::now(),
                }),
            )
            .await;
    }

    /// Customer resolves an open price range: accept unlocks the price and
    /// location sharing, reject terminates the booking.
    pub async fn confirm_price(
        &self,
        customer_user: &User,
        booking_id: Uuid,
        accepted: bool,
    ) -> Result<Booking, ServiceError> {
        let customer = self
            .db_client
            .get_customer_by_user(customer_user.id)
            .await?
            .ok_or(ServiceError::CustomerProfileNotFound)?;

        let mut booking = self
            .db_client
            .get_booking_for_customer(booking_id, customer.id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if booking.status != BookingStatus::Accepted {
            return Err(ServiceError::Validation(
                "Price can only be confirmed on an accepted booking".to_string(),
            ));
        }

        if accepted {
            pricing::confirm_price(&mut booking);
        } else {
            ensure_transition(&booking, BookingStatus::Rejected)?;
            pricing::reject_price(&mut booking);
        }
        let booking = self.db_client.save_negotiation(&booking).await?;

        if accepted {
            if let Some(provider) = self.db_client.resolve_provider(booking.provider_id).await? {
                self.events
                    .publish(
                        &user_room(provider.user_id),
                        "booking:price-confirmed",
                        json!({
                            "booking_id": booking_id,
                            "message": "Customer accepted the price range. Location sharing enabled.",
                            "timestamp": Utc::now(),
                        }),
                    )
                    .await;
            }
        }

        Ok(booking)
    }

    /// Provider marks the job done.
    pub async fn complete(
        &self,
        provider_user: &User,
        booking_id: Uuid,
    ) -> Result<Booking, ServiceError> {
        let provider = self
            .db_client
            .get_provider_by_user(provider_user.id)
            .await?
            .ok_or(ServiceError::Forbidden(
                "Only providers can complete bookings".to_string(),
            ))?;

        let booking = self
            .db_client
            .get_booking_for_provider(booking_id, provider.id, provider.user_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        ensure_transition(&booking, BookingStatus::Completed)?;

        let booking = self
            .db_client
            .update_status(booking_id, BookingStatus::Completed)
            .await?;

        self.events
            .publish(
                &booking_room(booking_id),
                "booking:status-changed",
                json!({
                    "booking_id": booking_id,
                    "status": booking.status,
                    "timestamp": Utc::now(),
                }),
            )
            .await;

        Ok(booking)
    }

    /// Customer reviews a completed booking. The provider's running average
    /// is advanced with the incremental-mean formula under an optimistic
    /// retry loop keyed on rating_count.
    pub async fn submit_review(
        &self,
        customer_user: &User,
        booking_id: Uuid,
        rating: i32,
        review: String,
    ) -> Result<Booking, ServiceError> {
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

        if booking.status != BookingStatus::Completed {
            return Err(ServiceError::Validation(
                "Can only review completed bookings".to_string(),
            ));
        }

        if booking.rating.is_some() {
            return Err(ServiceError::Conflict(
                "A review has already been submitted for this booking".to_string(),
            ));
        }

        let review = ammonia::clean(&review);
        let booking = self
            .db_client
            .set_review(booking_id, rating, review)
            .await?;

        self.credit_provider_rating(booking.provider_id, rating)
            .await?;

        Ok(booking)
    }

    async fn credit_provider_rating(
        &self,
        provider_reference: Uuid,
        rating: i32,
    ) -> Result<Provider, ServiceError> {
        for _ in 0..RATING_RETRY_LIMIT {
            let provider = self
                .db_client
                .resolve_provider(provider_reference)
                .await?
                .ok_or(ServiceError::ProviderNotFound)?;

            let (new_avg, new_count) =
                next_rating_average(provider.rating, provider.rating_count, rating);

            if let Some(updated) = self
                .db_client
                .try_apply_provider_rating(provider.id, provider.rating_count, new_avg, new_count)
                .await?
            {
                return Ok(updated);
            }
            // Lost the race to a concurrent review; re-read and retry.
        }

        Err(ServiceError::Conflict(
            "Provider rating is being updated concurrently, please retry".to_string(),
        ))
    }

    /// Fetch a booking for either party (or an admin).
    pub async fn get_booking_for_party(
        &self,
        user: &User,
        booking_id: Uuid,
    ) -> Result<(Booking, Option<Customer>, Option<Provider>), ServiceError> {
        let booking = self
            .db_client
            .get_booking(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        let customer = self.db_client.get_customer_by_user(user.id).await?;
        let provider = self.db_client.get_provider_by_user(user.id).await?;

        let is_customer = customer
            .as_ref()
            .map(|c| c.id == booking.customer_id)
            .unwrap_or(false);
        let is_provider = provider
            .as_ref()
            .map(|p| p.owns_booking_reference(booking.provider_id))
            .unwrap_or(false);

        if !is_customer && !is_provider && user.role != crate::models::usermodel::UserRole::Admin {
            return Err(ServiceError::Forbidden(
                "Not allowed to view this booking".to_string(),
            ));
        }

        let booking_customer = self
            .db_client
            .get_customer_by_id(booking.customer_id)
            .await?;
        let booking_provider = self.db_client.resolve_provider(booking.provider_id).await?;

        Ok((booking, booking_customer, booking_provider))
    }

    async fn customer_user_id(&self, customer_id: Uuid) -> Option<Uuid> {
        // customer_id is a profile id; map back to the owning user for the
        // per-user notification room.
        match self.db_client.get_customer_by_id(customer_id).await {
            Ok(Some(customer)) => Some(customer.user_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::test_booking;
    use crate::service::insurance_service::INSURANCE_PREMIUM;
    use crate::service::pricing::PriceOffer;

    #[test]
    fn incremental_average_advances_the_running_mean() {
        let (avg, count) = next_rating_average(4.0, 2, 5);
        assert_eq!(count, 3);
        assert!((avg - (4.0 + (5.0 - 4.0) / 3.0)).abs() < 1e-12);
        assert!((avg - 4.333333333333333).abs() < 1e-12);
    }

    #[test]
    fn incremental_average_equals_batch_average() {
        let ratings = [5, 3, 4, 5, 1, 2, 5];

        let mut avg = 0.0;
        let mut count = 0;
        for r in ratings {
            let (next, next_count) = next_rating_average(avg, count, r);
            avg = next;
            count = next_count;
        }

        let batch: f64 = ratings.iter().map(|r| *r as f64).sum::<f64>() / ratings.len() as f64;
        assert_eq!(count as usize, ratings.len());
        assert!((avg - batch).abs() < 1e-9);
    }

    #[test]
    fn decision_parsing_rejects_unknown_verbs() {
        assert_eq!(Decision::parse("accept").unwrap(), Decision::Accept);
        assert_eq!(Decision::parse("reject").unwrap(), Decision::Reject);
        assert!(Decision::parse("maybe").is_err());
    }

    #[test]
    fn transition_guard_blocks_illegal_moves() {
        let mut booking = test_booking();
        booking.status = BookingStatus::Rejected;
        assert!(ensure_transition(&booking, BookingStatus::Accepted).is_err());
        assert!(ensure_transition(&booking, BookingStatus::Completed).is_err());

        booking.status = BookingStatus::Pending;
        assert!(ensure_transition(&booking, BookingStatus::Accepted).is_ok());
        assert!(ensure_transition(&booking, BookingStatus::Completed).is_err());
    }

    /// The full lifecycle of the happy path, driven through the pure state
    /// machine: request -> range offer -> confirm -> complete -> review.
    #[test]
    fn end_to_end_lifecycle_over_the_state_machine() {
        let mut booking = test_booking();

        // Creation with insurance opted in: premium lands on the amount.
        let quote = quote_policy(true);
        booking.insurance_opted = quote.opted;
        booking.insurance_policy_id = quote.policy_id.clone();
        booking.amount = BigDecimal::try_from(0.0 + quote.cost).unwrap();
        assert!(booking.insurance_opted);
        assert!(booking.insurance_policy_id.is_some());
        assert_eq!(booking.amount.to_f64().unwrap(), INSURANCE_PREMIUM);

        // Provider accepts with a range.
        assert!(ensure_transition(&booking, BookingStatus::Accepted).is_ok());
        pricing::apply_acceptance(
            &mut booking,
            Some(&PriceOffer::Range { min: 500.0, max: 800.0 }),
        );
        assert_eq!(booking.status, BookingStatus::Accepted);
        assert!(!booking.is_price_accepted);
        assert!(booking.is_location_shared);

        // Customer confirms the price.
        pricing::confirm_price(&mut booking);
        assert!(booking.is_price_accepted);
        assert!(booking.is_location_shared);

        // Provider completes.
        assert!(ensure_transition(&booking, BookingStatus::Completed).is_ok());
        booking.status = BookingStatus::Completed;

        // Customer reviews with a 5; provider had rating 4.0 over 2.
        assert!(booking.rating.is_none());
        booking.rating = Some(5);
        let (avg, count) = next_rating_average(4.0, 2, 5);
        assert_eq!(count, 3);
        assert!((avg - 4.333333333333333).abs() < 1e-12);

        // Second review attempt must be refused upstream.
        assert!(booking.rating.is_some());
    }
}
