use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::bookingmodel::{
    Booking, BookingStatus, LocationSnapshot, PaymentMethod,
};

const BOOKING_COLUMNS: &str = r#"
    id, customer_id, provider_id, service_type, description, status,
    scheduled_time, price_min, price_max, is_price_accepted,
    is_location_shared, insurance_opted, insurance_cost, insurance_policy_id,
    insurance_coverage, location_snapshots, verification_qr_data, verified_at,
    payment_method, payment_status, amount, rating, review,
    created_at, updated_at
"#;

#[async_trait]
pub trait BookingExt {
    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        service_type: Option<String>,
        description: String,
        scheduled_time: Option<DateTime<Utc>>,
        amount: BigDecimal,
        insurance_opted: bool,
        insurance_cost: BigDecimal,
        insurance_policy_id: Option<String>,
        insurance_coverage: Option<String>,
    ) -> Result<Booking, sqlx::Error>;

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error>;

    async fn get_booking_for_customer(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error>;

    /// Provider-side lookup. The stored provider reference may be the
    /// profile id or the owning user id, so both are matched.
    async fn get_booking_for_provider(
        &self,
        booking_id: Uuid,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error>;

    async fn get_bookings_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error>;

    async fn get_bookings_by_provider(
        &self,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error>;

    async fn get_completed_bookings_by_provider(
        &self,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error>;

    /// Persist the negotiation-affecting columns after a decision or price
    /// confirmation has been applied to the in-memory booking.
    async fn save_negotiation(&self, booking: &Booking) -> Result<Booking, sqlx::Error>;

    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, sqlx::Error>;

    async fn set_review(
        &self,
        booking_id: Uuid,
        rating: i32,
        review: String,
    ) -> Result<Booking, sqlx::Error>;

    async fn set_verification_qr(
        &self,
        booking_id: Uuid,
        payload: String,
    ) -> Result<Booking, sqlx::Error>;

    async fn stamp_verified(&self, booking_id: Uuid) -> Result<Booking, sqlx::Error>;

    async fn record_payment(
        &self,
        booking_id: Uuid,
        method: PaymentMethod,
        amount: BigDecimal,
    ) -> Result<Booking, sqlx::Error>;

    async fn append_location_snapshot(
        &self,
        booking_id: Uuid,
        snapshot: LocationSnapshot,
    ) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl BookingExt for DBClient {
    async fn create_booking(
        &self,
        customer_id: Uuid,
        provider_id: Uuid,
        service_type: Option<String>,
        description: String,
        scheduled_time: Option<DateTime<Utc>>,
        amount: BigDecimal,
        insurance_opted: bool,
        insurance_cost: BigDecimal,
        insurance_policy_id: Option<String>,
        insurance_coverage: Option<String>,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
            (customer_id, provider_id, service_type, description, scheduled_time,
             amount, insurance_opted, insurance_cost, insurance_policy_id, insurance_coverage)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(provider_id)
        .bind(service_type)
        .bind(description)
        .bind(scheduled_time)
        .bind(amount)
        .bind(insurance_opted)
        .bind(insurance_cost)
        .bind(insurance_policy_id)
        .bind(insurance_coverage)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_booking_for_customer(
        &self,
        booking_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 AND customer_id = $2"
        ))
        .bind(booking_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_booking_for_provider(
        &self,
        booking_id: Uuid,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE id = $1 AND (provider_id = $2 OR provider_id = $3)
            "#
        ))
        .bind(booking_id)
        .bind(provider_id)
        .bind(provider_user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_bookings_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_bookings_by_provider(
        &self,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE provider_id = $1 OR provider_id = $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(provider_id)
        .bind(provider_user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_completed_bookings_by_provider(
        &self,
        provider_id: Uuid,
        provider_user_id: Uuid,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE (provider_id = $1 OR provider_id = $2) AND status = 'completed'
            ORDER BY created_at DESC
            "#
        ))
        .bind(provider_id)
        .bind(provider_user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn save_negotiation(&self, booking: &Booking) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $2,
                price_min = $3,
                price_max = $4,
                is_price_accepted = $5,
                is_location_shared = $6,
                amount = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.status)
        .bind(booking.price_min.clone())
        .bind(booking.price_max.clone())
        .bind(booking.is_price_accepted)
        .bind(booking.is_location_shared)
        .bind(booking.amount.clone())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_review(
        &self,
        booking_id: Uuid,
        rating: i32,
        review: String,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET rating = $2, review = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(rating)
        .bind(review)
        .fetch_one(&self.pool)
        .await
    }

    async fn set_verification_qr(
        &self,
        booking_id: Uuid,
        payload: String,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET verification_qr_data = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
    }

    async fn stamp_verified(&self, booking_id: Uuid) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET verified_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn record_payment(
        &self,
        booking_id: Uuid,
        method: PaymentMethod,
        amount: BigDecimal,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET payment_method = $2,
                amount = $3,
                payment_status = 'paid',
                updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking_id)
        .bind(method)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn append_location_snapshot(
        &self,
        booking_id: Uuid,
        snapshot: LocationSnapshot,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET location_snapshots = location_snapshots || $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(Json(snapshot))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
