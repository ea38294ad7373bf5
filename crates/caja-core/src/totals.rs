//! # Sale Totals
//!
//! Pure aggregation of line subtotals into document totals.
//!
//! ## Invariant
//! ```text
//! net   = Σ (quantity_i × unit_price_i)
//! tax   = round(net × 19%, cent)
//! total = net + tax
//! ```
//! Totals are computed exactly once, when the sale is created; edits made
//! later through generic CRUD never recompute them.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::TaxRate;

/// The three monetary totals of a sale document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub net: Money,
    pub tax: Money,
    pub total: Money,
}

impl SaleTotals {
    /// All-zero totals, the state a freshly created document starts in.
    pub const fn zero() -> Self {
        SaleTotals {
            net: Money::zero(),
            tax: Money::zero(),
            total: Money::zero(),
        }
    }

    /// Derives tax and final total from an accumulated net amount.
    pub fn from_net(net: Money) -> CoreResult<Self> {
        let tax = net.tax(TaxRate::IVA);
        let total = net.checked_add(tax).ok_or(CoreError::MoneyOverflow {
            context: "final total".to_string(),
        })?;
        Ok(SaleTotals { net, tax, total })
    }

    /// Aggregates line subtotals in order, then derives tax and total.
    ///
    /// An empty iterator yields zero totals (a zero-total sale is legal).
    pub fn from_subtotals<I>(subtotals: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        let mut net = Money::zero();
        for subtotal in subtotals {
            net = net.checked_add(subtotal).ok_or(CoreError::MoneyOverflow {
                context: "net total".to_string(),
            })?;
        }
        Self::from_net(net)
    }
}

/// Computes one line's subtotal: quantity × unit price, exact.
pub fn line_subtotal(quantity: i64, unit_price: Money) -> CoreResult<Money> {
    unit_price
        .checked_mul_quantity(quantity)
        .ok_or(CoreError::MoneyOverflow {
            context: "line subtotal".to_string(),
        })
}
