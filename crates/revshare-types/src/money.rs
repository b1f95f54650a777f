//! Integer cent amounts and exact dollar parsing.
//!
//! Dollar values arrive as JSON numbers. They are parsed from the number's
//! textual form into a [`Decimal`] so that `19.99` converts to exactly
//! `1999` cents, then floored to the cent.

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, ValidationError, CENTS_PER_DOLLAR};

/// A non-negative amount of money in whole cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub u64);

/// Reason given for amounts below zero.
pub const NEGATIVE_AMOUNT: &str = "must be a non-negative amount";

/// Reason given for amounts above [`Cents::MAX`].
pub const AMOUNT_TOO_LARGE: &str = "exceeds the maximum amount";

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Largest amount the ledger can store, `i64::MAX` cents.
    pub const MAX: Cents = Cents(i64::MAX as u64);

    /// `floor(dollars * 100)`. Returns `None` for negative values or values above [`Cents::MAX`].
    pub fn from_dollars(dollars: Decimal) -> Option<Self> {
        if dollars.is_sign_negative() && !dollars.is_zero() {
            return None;
        }
        let cents = dollars
            .checked_mul(Decimal::from(CENTS_PER_DOLLAR))?
            .floor()
            .to_u64()?;
        (cents <= Self::MAX.0).then_some(Cents(cents))
    }

    /// Dollar value for display and wire output. Never used for arithmetic.
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / CENTS_PER_DOLLAR as f64
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Cents> {
        self.0.checked_mul(factor).map(Cents)
    }

    /// Subtraction floored at zero.
    pub fn saturating_sub(self, other: Cents) -> Cents {
        Cents(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / CENTS_PER_DOLLAR, self.0 % CENTS_PER_DOLLAR)
    }
}

/// Parse a JSON number into an exact decimal dollar value.
///
/// # Errors
///
/// - [`ValidationError::Missing`] if the value is absent or null
/// - [`ValidationError::WrongType`] if the value is not a JSON number
/// - [`ValidationError::OutOfRange`] if the magnitude is beyond any amount
pub fn parse_dollars(field: &'static str, value: Option<&Value>) -> Result<Decimal> {
    let number = match value {
        None | Some(Value::Null) => return Err(ValidationError::Missing(field)),
        Some(Value::Number(n)) => n,
        Some(_) => {
            return Err(ValidationError::WrongType {
                field,
                expected: "a number",
            })
        }
    };

    let text = number.to_string();
    if let Ok(dollars) = Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        return Ok(dollars);
    }

    // Outside Decimal's 28-digit scale: either far below a cent or far too large.
    let approx = number.as_f64().unwrap_or(f64::INFINITY);
    if approx.abs() < 1.0 {
        return Ok(Decimal::new(approx.signum() as i64, 28));
    }
    Err(ValidationError::OutOfRange {
        field,
        reason: if approx < 0.0 {
            NEGATIVE_AMOUNT
        } else {
            AMOUNT_TOO_LARGE
        },
    })
}

/// Convert parsed dollars to cents, naming which bound was crossed.
pub fn to_cents(field: &'static str, dollars: Decimal) -> Result<Cents> {
    Cents::from_dollars(dollars).ok_or(ValidationError::OutOfRange {
        field,
        reason: if dollars.is_sign_negative() {
            NEGATIVE_AMOUNT
        } else {
            AMOUNT_TOO_LARGE
        },
    })
}

/// Parse a JSON number into cents, rejecting negative and oversized amounts.
pub fn parse_cents(field: &'static str, value: Option<&Value>) -> Result<Cents> {
    let dollars = parse_dollars(field, value)?;
    to_cents(field, dollars)
}
