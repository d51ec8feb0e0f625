pub mod bookingdb;
pub mod claimdb;
pub mod db;
pub mod profiledb;
pub mod userdb;
pub mod walletdb;
