//! Products and the investments that fund them.

use serde::{Deserialize, Serialize};

use crate::Cents;

/// A fundable product. Read-only for revenue distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Total capital raised; the ownership denominator.
    #[ts(type = "number")]
    pub current_funding: Cents,
}

/// One investor's stake in a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    #[ts(type = "number")]
    pub amount: Cents,
}

impl Investment {
    /// Whether this row can take part in a distribution at all.
    pub fn is_eligible(&self) -> bool {
        !self.amount.is_zero() && !self.user_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn investment(user_id: &str, amount: u64) -> Investment {
        Investment {
            id: "inv-1".to_string(),
            product_id: "prod-1".to_string(),
            user_id: user_id.to_string(),
            amount: Cents(amount),
        }
    }

    #[test]
    fn test_eligibility() {
        assert!(investment("alice", 100).is_eligible());
        assert!(!investment("alice", 0).is_eligible());
        assert!(!investment("", 100).is_eligible());
        assert!(!investment("   ", 100).is_eligible());
    }

    #[test]
    fn test_product_serializes_camel_case() {
        let product = Product {
            id: "prod-1".to_string(),
            name: "Lamp".to_string(),
            current_funding: Cents(20_000),
        };
        let json = serde_json::to_value(&product).expect("serialize");
        assert_eq!(json["currentFunding"], 20_000);
    }
}
