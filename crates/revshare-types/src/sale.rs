//! Sale events and their boundary parsing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::money::{parse_cents, parse_dollars, to_cents};
use crate::{Cents, Result, ValidationError};

/// A single product sale. Created per call, never stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub product_id: String,
    /// Total sale revenue.
    pub sale_amount: Cents,
    /// Manufacturing cost of one unit. Zero is valid.
    pub manufacturing_cost_per_unit: Cents,
    pub quantity: u64,
    /// Opaque caller-supplied order reference.
    pub order_id: String,
}

impl SaleEvent {
    /// Parse the callable payload
    /// `{productId, saleAmount, manufacturingCost, quantity, orderId}`.
    pub fn from_json(params: &Value) -> Result<Self> {
        let product_id = required_str(params, "productId")?;

        let sale_dollars = parse_dollars("saleAmount", params.get("saleAmount"))?;
        if sale_dollars <= Decimal::ZERO {
            return Err(ValidationError::OutOfRange {
                field: "saleAmount",
                reason: "must be greater than zero",
            });
        }
        let sale_amount = to_cents("saleAmount", sale_dollars)?;

        let manufacturing_cost_per_unit =
            parse_cents("manufacturingCost", params.get("manufacturingCost"))?;
        let quantity = required_count(params, "quantity")?;
        let order_id = required_str(params, "orderId")?;

        let sale = Self {
            product_id,
            sale_amount,
            manufacturing_cost_per_unit,
            quantity,
            order_id,
        };
        sale.validate()?;
        Ok(sale)
    }

    /// Check the invariants every sale must satisfy before computation.
    pub fn validate(&self) -> Result<()> {
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::Missing("productId"));
        }
        if self.order_id.trim().is_empty() {
            return Err(ValidationError::Missing("orderId"));
        }
        if self.sale_amount.is_zero() {
            return Err(ValidationError::OutOfRange {
                field: "saleAmount",
                reason: "must be at least one cent",
            });
        }
        if self.quantity == 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// A required, non-empty string field.
pub fn required_str(params: &Value, field: &'static str) -> Result<String> {
    match params.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::Missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// A required positive integer field.
pub fn required_count(params: &Value, field: &'static str) -> Result<u64> {
    match params.get(field) {
        None | Some(Value::Null) => Err(ValidationError::Missing(field)),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Err(ValidationError::OutOfRange {
                field,
                reason: "must be greater than zero",
            }),
            Some(count) => Ok(count),
            None => Err(ValidationError::WrongType {
                field,
                expected: "a positive integer",
            }),
        },
        Some(_) => Err(ValidationError::WrongType {
            field,
            expected: "a positive integer",
        }),
    }
}
