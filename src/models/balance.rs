use crate::models::bucket::Bucket;
use rocket::serde::Serialize;
use schemars::JsonSchema;

#[derive(Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CurrencyBalance {
    pub currency_code: String,
    pub balance_minor: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct BucketBalances {
    pub bucket: Bucket,
    /// Non-zero, visible balances sorted by currency code.
    pub balances: Vec<CurrencyBalance>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct BucketBalancesResponse {
    pub buckets: Vec<BucketBalances>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct OverallBalancesResponse {
    pub balances: Vec<CurrencyBalance>,
}

/// Sum of all visible balances expressed in the base currency.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ConvertedTotal {
    pub base_currency: String,
    pub total_minor: i64,
    /// Currencies with no known rate, added to the total 1:1.
    pub unconverted_currencies: Vec<String>,
}
