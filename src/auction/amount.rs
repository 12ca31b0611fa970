//! Money amounts used for starting bids, bids and current prices.
//!
//! Amounts are stored as `NUMERIC(10,2)`, so every value held by an
//! [`Amount`] is positive, has at most two fractional digits and at most ten
//! digits in total. Values are normalized to exactly two fractional digits,
//! which keeps `"15"` and `"15.00"` equal and renders both as `15.00`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits kept for every amount.
pub const SCALE: u32 = 2;

/// Reasons raw text cannot become an [`Amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is blank")]
    Blank,
    #[error("amount is not a decimal number")]
    Malformed,
    #[error("amount must be greater than zero")]
    NotPositive,
    #[error("amount has more than two decimal places")]
    TooPrecise,
    #[error("amount exceeds 99999999.99")]
    TooLarge,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "Decimal", try_from = "Decimal")]
#[sqlx(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Smallest accepted amount, also the default starting bid.
    pub fn min_bid() -> Self {
        Self(Decimal::new(1, SCALE))
    }

    fn max_value() -> Decimal {
        Decimal::new(99_999_999_99, SCALE)
    }

    /// Parse user input such as `" 15.5 "` into an amount.
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AmountError::Blank);
        }
        let value = Decimal::from_str(raw).map_err(|_| AmountError::Malformed)?;
        Self::from_decimal(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        // trailing zeros ("1.500") are not extra precision
        if value.normalize().scale() > SCALE {
            return Err(AmountError::TooPrecise);
        }
        if value > Self::max_value() {
            return Err(AmountError::TooLarge);
        }
        let mut value = value;
        value.rescale(SCALE);
        Ok(Self(value))
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::from_decimal(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Accept an amount field sent either as text (`"15.50"`) or as a JSON
/// number (`15.5`), keeping the raw text for [`Amount::parse`].
pub fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("15", "15.00")]
    #[case(" 15.5 ", "15.50")]
    #[case("0.01", "0.01")]
    #[case("1.500", "1.50")]
    #[case("99999999.99", "99999999.99")]
    fn parses_valid_amounts(#[case] raw: &str, #[case] expected: &str) {
        let amount = Amount::parse(raw).expect("valid amount");
        assert_eq!(amount.to_string(), expected);
    }

    #[rstest]
    #[case("", AmountError::Blank)]
    #[case("   ", AmountError::Blank)]
    #[case("ten", AmountError::Malformed)]
    #[case("1,50", AmountError::Malformed)]
    #[case("0", AmountError::NotPositive)]
    #[case("-3.00", AmountError::NotPositive)]
    #[case("1.005", AmountError::TooPrecise)]
    #[case("100000000", AmountError::TooLarge)]
    fn rejects_invalid_amounts(#[case] raw: &str, #[case] expected: AmountError) {
        assert_eq!(Amount::parse(raw), Err(expected));
    }

    #[test]
    fn equal_values_compare_equal_regardless_of_input_scale() {
        assert_eq!(Amount::parse("15").unwrap(), Amount::parse("15.00").unwrap());
        assert!(Amount::parse("15.01").unwrap() > Amount::parse("15").unwrap());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let amount = Amount::parse("20").unwrap();
        assert_eq!(serde_json::to_value(amount).unwrap(), serde_json::json!("20.00"));
    }

    #[rstest]
    #[case(serde_json::json!("-5"))]
    #[case(serde_json::json!("0"))]
    #[case(serde_json::json!("1.005"))]
    fn deserializing_applies_the_same_checks(#[case] raw: serde_json::Value) {
        assert!(serde_json::from_value::<Amount>(raw).is_err());
    }

    #[test]
    fn deserializes_valid_decimal() {
        let amount: Amount = serde_json::from_value(serde_json::json!("7.5")).unwrap();
        assert_eq!(amount, Amount::parse("7.50").unwrap());
    }

    #[derive(Debug, Deserialize)]
    struct BidBody {
        #[serde(deserialize_with = "text_or_number")]
        amount: String,
    }

    #[rstest]
    #[case(serde_json::json!({ "amount": "15.50" }), "15.50")]
    #[case(serde_json::json!({ "amount": 15 }), "15")]
    #[case(serde_json::json!({ "amount": 15.5 }), "15.5")]
    fn amount_text_accepts_strings_and_numbers(
        #[case] body: serde_json::Value,
        #[case] expected: &str,
    ) {
        let body: BidBody = serde_json::from_value(body).unwrap();
        assert_eq!(body.amount, expected);
    }

    #[test]
    fn amount_text_rejects_other_json_types() {
        let err = serde_json::from_value::<BidBody>(serde_json::json!({ "amount": true }));
        assert!(err.is_err());
    }
}
