//! `--item` arguments
//!
//! `<sku-or-query>=<bottles>[/<cases>]`, for example `PN19=12`, `PN20M=/1.5`
//! or `pinot noir 2019=6/0.5`. Either quantity may be left empty, not both.

use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemSpecError {
    #[error("expected <sku-or-query>=<bottles>[/<cases>], got {0:?}")]
    Format(String),

    #[error("missing product in {0:?}")]
    MissingProduct(String),

    #[error("no quantity in {0:?}")]
    MissingQuantity(String),

    #[error("invalid bottle count {0:?}")]
    Bottles(String),

    #[error("invalid case count {0:?}")]
    Cases(String),
}

/// One requested line item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    /// Exact SKU, or search text when no SKU matches
    pub product: String,
    pub bottles: Option<i64>,
    pub cases: Option<f64>,
}

impl FromStr for ItemSpec {
    type Err = ItemSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (product, quantities) = s
            .rsplit_once('=')
            .ok_or_else(|| ItemSpecError::Format(s.to_string()))?;

        let product = product.trim();
        if product.is_empty() {
            return Err(ItemSpecError::MissingProduct(s.to_string()));
        }

        let (bottles, cases) = match quantities.split_once('/') {
            Some((b, c)) => (b.trim(), c.trim()),
            None => (quantities.trim(), ""),
        };

        let bottles = if bottles.is_empty() {
            None
        } else {
            Some(
                bottles
                    .parse::<i64>()
                    .map_err(|_| ItemSpecError::Bottles(bottles.to_string()))?,
            )
        };
        let cases = if cases.is_empty() {
            None
        } else {
            match cases.parse::<f64>() {
                Ok(c) if c.is_finite() => Some(c),
                _ => return Err(ItemSpecError::Cases(cases.to_string())),
            }
        };

        if bottles.is_none() && cases.is_none() {
            return Err(ItemSpecError::MissingQuantity(s.to_string()));
        }

        Ok(Self {
            product: product.to_string(),
            bottles,
            cases,
        })
    }
}
