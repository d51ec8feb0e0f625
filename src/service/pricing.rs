use bigdecimal::BigDecimal;

use crate::models::bookingmodel::{Booking, BookingStatus};
use crate::service::error::ServiceError;

/// The two offer shapes a provider can attach when accepting a request.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceOffer {
    Amount(f64),
    Range { min: f64, max: f64 },
}

/// Interpret the raw decision fields. A full `{min,max}` pair wins over a
/// point amount; a lone bound is malformed. `None` means a plain accept
/// with no pricing attached.
pub fn parse_offer(
    amount: Option<f64>,
    price_min: Option<f64>,
    price_max: Option<f64>,
) -> Result<Option<PriceOffer>, ServiceError> {
    match (price_min, price_max) {
        (Some(min), Some(max)) => {
            if min > max {
                return Err(ServiceError::Validation(
                    "price range minimum cannot exceed maximum".to_string(),
                ));
            }
            if min < 0.0 {
                return Err(ServiceError::Validation(
                    "price range cannot be negative".to_string(),
                ));
            }
            Ok(Some(PriceOffer::Range { min, max }))
        }
        (Some(_), None) | (None, Some(_)) => Err(ServiceError::Validation(
            "price range requires both minimum and maximum".to_string(),
        )),
        (None, None) => match amount {
            Some(a) if a > 0.0 => Ok(Some(PriceOffer::Amount(a))),
            Some(a) if a < 0.0 => Err(ServiceError::Validation(
                "amount cannot be negative".to_string(),
            )),
            _ => Ok(None),
        },
    }
}

/// Apply an acceptance to the booking.
///
/// A direct amount short-circuits the explicit confirm step: location
/// sharing unlocks immediately and no further customer action is needed.
/// A range instead resets `is_price_accepted` and waits for the customer's
/// confirm-price call, while still unlocking location sharing right away.
pub fn apply_acceptance(booking: &mut Booking, offer: Option<&PriceOffer>) {
    booking.status = BookingStatus::Accepted;
    match offer {
        Some(PriceOffer::Range { min, max }) => {
            booking.price_min = BigDecimal::try_from(*min).ok();
            booking.price_max = BigDecimal::try_from(*max).ok();
            booking.is_price_accepted = false;
            booking.is_location_shared = true;
        }
        Some(PriceOffer::Amount(amount)) => {
            if let Ok(amount) = BigDecimal::try_from(*amount) {
                booking.amount = amount;
            }
            booking.is_location_shared = true;
        }
        None => {}
    }
}

/// Customer accepts the proposed range.
pub fn confirm_price(booking: &mut Booking) {
    booking.is_price_accepted = true;
    booking.is_location_shared = true;
}

/// Customer turns the proposed range down. Rejection is terminal.
pub fn reject_price(booking: &mut Booking) {
    booking.status = BookingStatus::Rejected;
    booking.is_price_accepted = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bookingmodel::test_booking;
    use num_traits::ToPrimitive;

    #[test]
    fn full_range_parses_and_validates_bounds() {
        let offer = parse_offer(None, Some(500.0), Some(800.0)).unwrap();
        assert_eq!(offer, Some(PriceOffer::Range { min: 500.0, max: 800.0 }));

        assert!(matches!(
            parse_offer(None, Some(900.0), Some(800.0)),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn lone_bound_is_malformed() {
        assert!(parse_offer(None, Some(500.0), None).is_err());
        assert!(parse_offer(None, None, Some(800.0)).is_err());
    }

    #[test]
    fn range_wins_over_amount_when_both_present() {
        let offer = parse_offer(Some(650.0), Some(500.0), Some(800.0)).unwrap();
        assert!(matches!(offer, Some(PriceOffer::Range { .. })));
    }

    #[test]
    fn zero_or_absent_amount_is_a_plain_accept() {
        assert_eq!(parse_offer(Some(0.0), None, None).unwrap(), None);
        assert_eq!(parse_offer(None, None, None).unwrap(), None);
    }

    #[test]
    fn amount_acceptance_short_circuits_the_confirm_step() {
        let mut booking = test_booking();
        apply_acceptance(&mut booking, Some(&PriceOffer::Amount(650.0)));

        assert_eq!(booking.status, BookingStatus::Accepted);
        assert!(booking.is_location_shared);
        // No pending confirmation: there is no range to resolve.
        assert!(!booking.has_unresolved_price_range());
        assert_eq!(booking.amount.to_f64().unwrap(), 650.0);
    }

    #[test]
    fn range_acceptance_waits_for_customer_confirmation() {
        let mut booking = test_booking();
        apply_acceptance(
            &mut booking,
            Some(&PriceOffer::Range { min: 500.0, max: 800.0 }),
        );

        assert_eq!(booking.status, BookingStatus::Accepted);
        assert!(!booking.is_price_accepted);
        assert!(booking.is_location_shared);
        assert!(booking.has_unresolved_price_range());
    }

    #[test]
    fn plain_acceptance_leaves_sharing_locked() {
        let mut booking = test_booking();
        apply_acceptance(&mut booking, None);

        assert_eq!(booking.status, BookingStatus::Accepted);
        assert!(!booking.is_location_shared);
        assert!(!booking.is_price_accepted);
    }

    #[test]
    fn price_acceptance_always_implies_location_sharing() {
        let mut booking = test_booking();
        apply_acceptance(
            &mut booking,
            Some(&PriceOffer::Range { min: 500.0, max: 800.0 }),
        );
        confirm_price(&mut booking);

        assert!(booking.is_price_accepted);
        assert!(booking.is_location_shared);
        assert!(!booking.has_unresolved_price_range());
    }

    #[test]
    fn price_rejection_terminates_the_booking() {
        let mut booking = test_booking();
        apply_acceptance(
            &mut booking,
            Some(&PriceOffer::Range { min: 500.0, max: 800.0 }),
        );
        reject_price(&mut booking);

        assert_eq!(booking.status, BookingStatus::Rejected);
        assert!(!booking.is_price_accepted);
        assert!(booking.status.is_terminal());
    }
}
