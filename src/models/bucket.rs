use crate::error::app_error::AppError;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::fmt;
use std::str::FromStr;

/// One of the three fixed buckets every record belongs to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Obligations,
    Investments,
    Personal,
}

impl Bucket {
    /// Every bucket, in display order.
    pub const ALL: [Bucket; 3] = [Bucket::Obligations, Bucket::Investments, Bucket::Personal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Obligations => "obligations",
            Bucket::Investments => "investments",
            Bucket::Personal => "personal",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "obligations" => Ok(Bucket::Obligations),
            "investments" => Ok(Bucket::Investments),
            "personal" => Ok(Bucket::Personal),
            other => Err(AppError::BadRequest(format!("Invalid bucket: {}", other))),
        }
    }
}

/// Direction of a transaction, also used to classify categories.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[serde(alias = "outcome")]
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Sign applied to an amount when folding it into a balance.
    pub fn sign(&self) -> i64 {
        match self {
            TransactionType::Income => 1,
            TransactionType::Expense => -1,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" | "outcome" => Ok(TransactionType::Expense),
            other => Err(AppError::BadRequest(format!("Invalid transaction type: {}", other))),
        }
    }
}
