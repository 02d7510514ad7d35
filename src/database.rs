pub mod category;
pub mod currency;
pub mod income_split;
pub mod postgres_repository;
pub mod preferences;
pub mod session;
pub mod transaction;
pub mod transfer;
pub mod user;
