pub mod booking_service;
pub mod error;
pub mod events;
pub mod insurance_service;
pub mod location_service;
pub mod pricing;
pub mod verification_service;
pub mod wallet_service;
