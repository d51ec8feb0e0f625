use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, db::DBClient, profiledb::ProfileExt},
    models::{
        bookingmodel::{BookingStatus, LocationSnapshot},
        profilemodel::{Customer, GeoPoint, Provider},
        usermodel::User,
    },
    service::{
        error::ServiceError,
        events::{booking_room, EventBroadcaster},
    },
};

#[derive(Debug, Serialize)]
pub struct TrackingInfo {
    pub provider_location: Option<GeoPoint>,
    pub provider_id: Uuid,
    pub chain_identity: String,
    pub status: BookingStatus,
}

/// Relays location samples between the two parties of a booking. The
/// profile keeps only the latest sample; bookings accumulate an append-only
/// trail of provider samples.
#[derive(Debug, Clone)]
pub struct LocationService {
    db_client: Arc<DBClient>,
    events: Arc<EventBroadcaster>,
}

impl LocationService {
    pub fn new(db_client: Arc<DBClient>, events: Arc<EventBroadcaster>) -> Self {
        Self { db_client, events }
    }

    pub async fn update_provider_location(
        &self,
        provider_user: &User,
        lat: f64,
        lng: f64,
        booking_id: Option<Uuid>,
    ) -> Result<Provider, ServiceError> {
        let provider = self
            .db_client
            .update_provider_location(provider_user.id, lat, lng)
            .await?
            .ok_or(ServiceError::ProviderProfileNotFound)?;

        if let Some(booking_id) = booking_id {
            // Only bookings actually assigned to this provider accumulate
            // the audit trail or see the live broadcast.
            if let Some(booking) = self
                .db_client
                .get_booking_for_provider(booking_id, provider.id, provider.user_id)
                .await?
            {
                self.db_client
                    .append_location_snapshot(
                        booking.id,
                        LocationSnapshot {
                            lat,
                            lng,
                            timestamp: Utc::now(),
                        },
                    )
                    .await?;

                self.events
                    .publish(
                        &booking_room(booking.id),
                        "provider:location",
                        json!({
                            "booking_id": booking.id,
                            "lat": lat,
                            "lng": lng,
                            "provider_id": provider.id,
                            "timestamp": Utc::now(),
                        }),
                    )
                    .await;
            }
        }

        Ok(provider)
    }

    pub async fn update_customer_location(
        &self,
        customer_user: &User,
        lat: f64,
        lng: f64,
        booking_id: Option<Uuid>,
    ) -> Result<Customer, ServiceError> {
        let customer = self
            .db_client
            .update_customer_location(customer_user.id, lat, lng)
            .await?
            .ok_or(ServiceError::CustomerProfileNotFound)?;

        if let Some(booking_id) = booking_id {
            if let Some(booking) = self
                .db_client
                .get_booking_for_customer(booking_id, customer.id)
                .await?
            {
                self.events
                    .publish(
                        &booking_room(booking.id),
                        "customer:location",
                        json!({
                            "booking_id": booking.id,
                            "lat": lat,
                            "lng": lng,
                            "customer_id": customer.id,
                            "timestamp": Utc::now(),
                        }),
                    )
                    .await;
            }
        }

        Ok(customer)
    }

    /// Provider position for a booking's customer. Refused outright while
    /// sharing is locked; never silently empty.
    pub async fn tracking(
        &self,
        customer_user: &User,
        booking_id: Uuid,
    ) -> Result<TrackingInfo, ServiceError> {
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

        if !booking.location_visible_to_customer() {
            return Err(ServiceError::Forbidden(
                "Location sharing not active yet".to_string(),
            ));
        }

        let provider = self
            .db_client
            .resolve_provider(booking.provider_id)
            .await?
            .ok_or(ServiceError::ProviderNotFound)?;

        Ok(TrackingInfo {
            provider_location: provider.current_location(),
            provider_id: provider.id,
            chain_identity: provider.chain_identity,
            status: booking.status,
        })
    }
}
