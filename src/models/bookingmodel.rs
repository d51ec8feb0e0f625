use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    // Declared for schema parity; no code path currently sets it.
    Cancelled,
}

impl BookingStatus {
    pub fn to_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Completed | BookingStatus::Cancelled
        )
    }

    /// Legal moves of the booking lifecycle. Rejection is terminal: there
    /// is no re-proposal path after a price rejection.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Accepted) | (Pending, Rejected) => true,
            (Accepted, InProgress) => true,
            (Accepted, Completed) | (InProgress, Completed) => true,
            // Price rejection on an accepted range offer
            (Accepted, Rejected) => true,
            (current, Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Offline,
    Online,
    Blockchain,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One provider location sample retained on the booking. Distinct from the
/// live pointer on the provider profile: this list is append-only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocationSnapshot {
    pub lat: f64,
    pub lng: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub service_type: Option<String>,
    pub description: String,
    pub status: BookingStatus,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub price_min: Option<BigDecimal>,
    pub price_max: Option<BigDecimal>,
    pub is_price_accepted: bool,
    pub is_location_shared: bool,
    pub insurance_opted: bool,
    pub insurance_cost: BigDecimal,
    pub insurance_policy_id: Option<String>,
    pub insurance_coverage: Option<String>,
    pub location_snapshots: Json<Vec<LocationSnapshot>>,
    pub verification_qr_data: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub amount: BigDecimal,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn has_unresolved_price_range(&self) -> bool {
        self.price_min.is_some() && self.price_max.is_some() && !self.is_price_accepted
    }

    /// Tracking reads are gated on explicit sharing or the booking having
    /// progressed past the negotiation stage.
    pub fn location_visible_to_customer(&self) -> bool {
        self.is_location_shared
            || matches!(
                self.status,
                BookingStatus::InProgress | BookingStatus::Completed
            )
    }
}

/// Baseline booking for unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_booking() -> Booking {
    Booking {
        id: Uuid::new_v4(),
        customer_id: Uuid::new_v4(),
        provider_id: Uuid::new_v4(),
        service_type: Some("Home Repair & Maintenance".to_string()),
        description: "Leaking kitchen tap".to_string(),
        status: BookingStatus::Pending,
        scheduled_time: None,
        price_min: None,
        price_max: None,
        is_price_accepted: false,
        is_location_shared: false,
        insurance_opted: false,
        insurance_cost: BigDecimal::from(0),
        insurance_policy_id: None,
        insurance_coverage: None,
        location_snapshots: Json(Vec::new()),
        verification_qr_data: None,
        verified_at: None,
        payment_method: None,
        payment_status: PaymentStatus::Pending,
        amount: BigDecimal::from(0),
        rating: None,
        review: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_moves_to_accepted_or_rejected() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Accepted));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Rejected));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::InProgress));
    }

    #[test]
    fn completion_reachable_from_accepted_and_in_progress() {
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Rejected.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn terminal_states_accept_no_transitions() {
        for terminal in [
            BookingStatus::Rejected,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(terminal.is_terminal());
            for next in [
                BookingStatus::Pending,
                BookingStatus::Accepted,
                BookingStatus::Rejected,
                BookingStatus::InProgress,
                BookingStatus::Completed,
                BookingStatus::Cancelled,
            ] {
                assert!(
                    !terminal.can_transition_to(next),
                    "{:?} -> {:?} should be illegal",
                    terminal,
                    next
                );
            }
        }
    }

    #[test]
    fn cancellation_reachable_from_any_non_terminal_state() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
    }

    #[test]
    fn location_gating_follows_sharing_flag_and_status() {
        let mut booking = test_booking();
        booking.status = BookingStatus::Pending;
        booking.is_location_shared = false;
        assert!(!booking.location_visible_to_customer());

        booking.is_location_shared = true;
        assert!(booking.location_visible_to_customer());

        booking.is_location_shared = false;
        booking.status = BookingStatus::InProgress;
        assert!(booking.location_visible_to_customer());

        booking.status = BookingStatus::Completed;
        assert!(booking.location_visible_to_customer());
    }
}
