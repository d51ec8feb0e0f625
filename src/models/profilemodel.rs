use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "service_preference", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServicePreference {
    Home,
    Office,
    Both,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub age: i32,
    pub service_type: String,
    pub specialization: String,
    pub identity_proof: String,
    pub service_area: String,
    pub available_timings: String,
    pub experience_years: i32,
    pub rating: f64,
    pub rating_count: i32,
    pub total_jobs: i32,
    pub chain_identity: String,
    pub emergency_service: bool,
    pub current_lat: Option<f64>,
    pub current_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    /// Bookings may reference a provider by profile id or by the owning
    /// user id. A lookup matches this provider when either id equals the
    /// stored reference.
    pub fn owns_booking_reference(&self, reference: Uuid) -> bool {
        self.id == reference || self.user_id == reference
    }

    pub fn current_location(&self) -> Option<GeoPoint> {
        match (self.current_lat, self.current_lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, Clone)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub service_preference: ServicePreference,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(id: Uuid, user_id: Uuid) -> Provider {
        Provider {
            id,
            user_id,
            age: 30,
            service_type: "Cleaning and Household".to_string(),
            specialization: String::new(),
            identity_proof: String::new(),
            service_area: "Downtown".to_string(),
            available_timings: "9-5".to_string(),
            experience_years: 4,
            rating: 0.0,
            rating_count: 0,
            total_jobs: 0,
            chain_identity: "prov_0011223344556677".to_string(),
            emergency_service: false,
            current_lat: None,
            current_lng: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn booking_reference_matches_profile_or_user_id() {
        let profile_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let p = provider(profile_id, user_id);

        assert!(p.owns_booking_reference(profile_id));
        assert!(p.owns_booking_reference(user_id));
        assert!(!p.owns_booking_reference(Uuid::new_v4()));
    }

    #[test]
    fn current_location_requires_both_coordinates() {
        let mut p = provider(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(p.current_location(), None);

        p.current_lat = Some(12.9716);
        assert_eq!(p.current_location(), None);

        p.current_lng = Some(77.5946);
        let loc = p.current_location().unwrap();
        assert_eq!(loc.lat, 12.9716);
        assert_eq!(loc.lng, 77.5946);
    }
}
