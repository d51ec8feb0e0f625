pub mod auth;
pub mod bookings;
pub mod claims;
pub mod customers;
pub mod payouts;
pub mod providers;
pub mod ws;
