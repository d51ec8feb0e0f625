pub mod authdtos;
pub mod bookingdtos;
pub mod claimdtos;
pub mod customerdtos;
pub mod providerdtos;
pub mod walletdtos;
