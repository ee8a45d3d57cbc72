//! The financial snapshot record.
//!
//! This is the plaintext a finance dashboard stores: five amounts
//! entered by the user. The codec does not require this shape. Any JSON
//! works, and `Codec::encode_record` accepts any `Serialize` type. The
//! struct exists so callers and the CLI can work with typed values.
//!
//! Amounts were historically stored as strings (`"2500"`), so
//! deserialization accepts either JSON numbers or numeric strings.

use serde::{Deserialize, Deserializer, Serialize};

/// A point-in-time summary of a user's finances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSnapshot {
    #[serde(deserialize_with = "amount")]
    pub assets: f64,
    #[serde(deserialize_with = "amount")]
    pub liabilities: f64,
    #[serde(deserialize_with = "amount")]
    pub loans: f64,
    #[serde(deserialize_with = "amount")]
    pub investments: f64,
    #[serde(deserialize_with = "amount")]
    pub expenses: f64,
}

impl FinancialSnapshot {
    /// Assets plus investments, minus liabilities and loans.
    pub fn net_worth(&self) -> f64 {
        self.assets + self.investments - self.liabilities - self.loans
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, f64); 5] {
        [
            ("Assets", self.assets),
            ("Liabilities", self.liabilities),
            ("Loans", self.loans),
            ("Investments", self.investments),
            ("Expenses", self.expenses),
        ]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

fn amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Amount::deserialize(deserializer)? {
        Amount::Number(n) => n,
        Amount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom("amount is not a number"))?,
    };
    if !value.is_finite() {
        return Err(serde::de::Error::custom("amount must be finite"));
    }
    Ok(value)
}
