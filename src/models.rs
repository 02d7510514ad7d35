pub mod balance;
pub mod bucket;
pub mod category;
pub mod currency;
pub mod health;
pub mod income_split;
pub mod preferences;
pub mod session;
pub mod transaction;
pub mod transfer;
pub mod user;
