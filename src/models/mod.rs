pub mod bookingmodel;
pub mod claimmodel;
pub mod profilemodel;
pub mod usermodel;
pub mod walletmodel;
