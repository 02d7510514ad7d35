pub mod balance;
pub mod currency;
pub mod exchange_rate;
pub mod income_split;
pub mod money;
