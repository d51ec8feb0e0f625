use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{bookingdb::BookingExt, db::DBClient, profiledb::ProfileExt, userdb::UserExt},
    models::{
        bookingmodel::BookingStatus,
        profilemodel::{GeoPoint, Provider},
        usermodel::User,
    },
    service::error::ServiceError,
};

/// On-site verification payload binding a booking to a specific provider
/// identity. Serialized into the QR the customer scans.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QrPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub provider_id: Uuid,
    pub chain_identity: String,
    pub name: String,
    pub service_type: String,
    pub specialization: String,
    pub experience_years: i32,
    pub rating: f64,
    pub generated_at: DateTime<Utc>,
}

/// Both the provider reference and the chain identity must match the
/// booking's resolved provider. Any single-field mismatch fails; there is
/// no partial credit.
pub fn payload_matches_provider(payload: &QrPayload, provider: &Provider) -> bool {
    payload.provider_id == provider.id && payload.chain_identity == provider.chain_identity
}

/// Dispatch rule for scanned payloads without a booking id: JSON payloads
/// carry the identity under `chain_identity` (or `provider_id` on older
/// digital-id cards); anything that does not parse as JSON is treated as
/// the raw identity string.
pub fn extract_chain_identity(qr_data: &str) -> Option<String> {
    match serde_json::from_str::<serde_json::Value>(qr_data) {
        Ok(parsed) => parsed
            .get("chain_identity")
            .or_else(|| parsed.get("provider_id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        Err(_) => Some(qr_data.to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub full_name: String,
    pub mobile_number: String,
}

/// Display-safe provider subset returned to the scanning customer. Never
/// carries credential material.
#[derive(Debug, Serialize)]
pub struct ProviderIdentityCard {
    pub id: Uuid,
    pub chain_identity: String,
    pub age: i32,
    pub service_type: String,
    pub specialization: String,
    pub identity_proof: String,
    pub service_area: String,
    pub available_timings: String,
    pub experience_years: i32,
    pub rating: f64,
    pub total_jobs: i32,
    pub emergency_service: bool,
    pub user: Option<PublicUser>,
}

#[derive(Debug, Serialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub provider_location: Option<GeoPoint>,
    pub provider: ProviderIdentityCard,
}

#[derive(Debug, Clone)]
pub struct VerificationService {
    db_client: Arc<DBClient>,
}

impl VerificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    /// Provider generates (or regenerates) the QR payload for a booking.
    /// Only the latest payload is valid; earlier ones are overwritten.
    pub async fn generate_booking_qr(
        &self,
        provider_user: &User,
        booking_id: Uuid,
    ) -> Result<String, ServiceError> {
        let provider = self
            .db_client
            .get_provider_by_user(provider_user.id)
            .await?
            .ok_or(ServiceError::Forbidden(
                "Only providers can generate QR".to_string(),
            ))?;

        let booking = self
            .db_client
            .get_booking_for_provider(booking_id, provider.id, provider.user_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::Rejected | BookingStatus::Cancelled
        ) {
            return Err(ServiceError::Validation(
                "QR can only be generated for an active booking".to_string(),
            ));
        }

        let payload = QrPayload {
            booking_id: Some(booking.id),
            provider_id: provider.id,
            chain_identity: provider.chain_identity.clone(),
            name: provider_user.full_name.clone(),
            service_type: provider.service_type.clone(),
            specialization: provider.specialization.clone(),
            experience_years: provider.experience_years,
            rating: provider.rating,
            generated_at: Utc::now(),
        };

        let payload_string = serde_json::to_string(&payload)
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;

        self.db_client
            .set_verification_qr(booking.id, payload_string.clone())
            .await?;

        Ok(payload_string)
    }

    /// Customer scanned a booking-scoped payload. Verifies the provider
    /// binding and stamps `verified_at` (idempotent on re-scan).
    pub async fn verify_booking_qr(
        &self,
        qr_data: &str,
    ) -> Result<VerificationOutcome, ServiceError> {
        let payload: QrPayload = serde_json::from_str(qr_data)
            .map_err(|_| ServiceError::Validation("Invalid QR payload".to_string()))?;

        let booking_id = payload.booking_id.ok_or_else(|| {
            ServiceError::Validation("Invalid QR payload: missing booking id".to_string())
        })?;

        let booking = self
            .db_client
            .get_booking(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        let provider = self
            .db_client
            .resolve_provider(booking.provider_id)
            .await?
            .ok_or(ServiceError::ProviderNotFound)?;

        if !payload_matches_provider(&payload, &provider) {
            return Err(ServiceError::Validation(
                "QR verification failed".to_string(),
            ));
        }

        self.db_client.stamp_verified(booking.id).await?;

        Ok(VerificationOutcome {
            verified: true,
            booking_id: Some(booking.id),
            provider_location: provider.current_location(),
            provider: self.identity_card(provider).await?,
        })
    }

    /// Standalone digital-id verification: no booking involved, just a
    /// lookup by the provider's chain identity.
    pub async fn verify_provider_qr(
        &self,
        qr_data: &str,
    ) -> Result<VerificationOutcome, ServiceError> {
        let chain_identity = extract_chain_identity(qr_data)
            .ok_or_else(|| ServiceError::Validation("Invalid QR payload".to_string()))?;

        let provider = self
            .db_client
            .get_provider_by_chain_identity(&chain_identity)
            .await?
            .ok_or(ServiceError::ProviderNotFound)?;

        Ok(VerificationOutcome {
            verified: true,
            booking_id: None,
            provider_location: provider.current_location(),
            provider: self.identity_card(provider).await?,
        })
    }

    async fn identity_card(
        &self,
        provider: Provider,
    ) -> Result<ProviderIdentityCard, ServiceError> {
        let user = self.db_client.get_user(Some(provider.user_id), None).await?;

        Ok(ProviderIdentityCard {
            id: provider.id,
            chain_identity: provider.chain_identity,
            age: provider.age,
            service_type: provider.service_type,
            specialization: provider.specialization,
            identity_proof: provider.identity_proof,
            service_area: provider.service_area,
            available_timings: provider.available_timings,
            experience_years: provider.experience_years,
            rating: provider.rating,
            total_jobs: provider.total_jobs,
            emergency_service: provider.emergency_service,
            user: user.map(|u| PublicUser {
                full_name: u.full_name,
                mobile_number: u.mobile_number,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> Provider {
        Provider {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            age: 35,
            service_type: "Appliance Services".to_string(),
            specialization: "Refrigeration".to_string(),
            identity_proof: "aadhaar-1234".to_string(),
            service_area: "Koramangala".to_string(),
            available_timings: "9am-6pm".to_string(),
            experience_years: 8,
            rating: 4.6,
            rating_count: 12,
            total_jobs: 40,
            chain_identity: "prov_a1b2c3d4e5f60718".to_string(),
            emergency_service: true,
            current_lat: Some(12.9352),
            current_lng: Some(77.6245),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payload_for(provider: &Provider, booking_id: Uuid) -> QrPayload {
        QrPayload {
            booking_id: Some(booking_id),
            provider_id: provider.id,
            chain_identity: provider.chain_identity.clone(),
            name: "Raju Electricals".to_string(),
            service_type: provider.service_type.clone(),
            specialization: provider.specialization.clone(),
            experience_years: provider.experience_years,
            rating: provider.rating,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn payload_round_trips_through_json() {
        let p = provider();
        let payload = payload_for(&p, Uuid::new_v4());
        let serialized = serde_json::to_string(&payload).unwrap();
        let parsed: QrPayload = serde_json::from_str(&serialized).unwrap();

        assert_eq!(parsed.provider_id, payload.provider_id);
        assert_eq!(parsed.chain_identity, payload.chain_identity);
        assert!(payload_matches_provider(&parsed, &p));
    }

    #[test]
    fn tampered_provider_id_fails_verification() {
        let p = provider();
        let mut payload = payload_for(&p, Uuid::new_v4());
        payload.provider_id = Uuid::new_v4();
        assert!(!payload_matches_provider(&payload, &p));
    }

    #[test]
    fn tampered_chain_identity_fails_verification() {
        let p = provider();
        let mut payload = payload_for(&p, Uuid::new_v4());
        payload.chain_identity = "prov_ffffffffffffffff".to_string();
        assert!(!payload_matches_provider(&payload, &p));
    }

    #[test]
    fn booking_id_presence_selects_the_booking_path() {
        let p = provider();
        let payload = payload_for(&p, Uuid::new_v4());
        let serialized = serde_json::to_string(&payload).unwrap();
        let parsed: QrPayload = serde_json::from_str(&serialized).unwrap();
        assert!(parsed.booking_id.is_some());

        let mut bare = payload.clone();
        bare.booking_id = None;
        let serialized = serde_json::to_string(&bare).unwrap();
        let parsed: QrPayload = serde_json::from_str(&serialized).unwrap();
        assert!(parsed.booking_id.is_none());
    }

    #[test]
    fn chain_identity_extraction_handles_json_and_raw_strings() {
        let json = r#"{"chain_identity": "prov_a1b2c3d4e5f60718"}"#;
        assert_eq!(
            extract_chain_identity(json).unwrap(),
            "prov_a1b2c3d4e5f60718"
        );

        let legacy = r#"{"provider_id": "prov_0011223344556677"}"#;
        assert_eq!(
            extract_chain_identity(legacy).unwrap(),
            "prov_0011223344556677"
        );

        // Not JSON: the scan itself is the identity string.
        assert_eq!(
            extract_chain_identity("prov_deadbeef00112233").unwrap(),
            "prov_deadbeef00112233"
        );
    }
}
