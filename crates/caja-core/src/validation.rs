//! # Validation Module
//!
//! Input validation for Caja POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Layer 1: HTTP deserialization (types, decimal parsing)         │
//! │  Layer 2: THIS MODULE - business rule validation                │
//! │  Layer 3: Database constraints (NOT NULL, UNIQUE, FK)           │
//! │                                                                 │
//! │  Defense in depth: each layer catches different errors          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation runs before the sale transaction begins, so a rejected
//! request never touches the store.

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{DocumentKind, NewSale};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quantity for a single line. Catches fat-finger entries
/// (1000 typed instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a line quantity: at least 1, bounded above.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 1 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a unit price: zero is allowed (giveaways), negative is not.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unitPrice".to_string(),
        });
    }
    Ok(())
}

/// Validates an optional SKU: short alphanumeric code.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }
    if sku.len() > 12 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 12,
        });
    }
    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }
    Ok(())
}

/// Validates a product name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }
    Ok(())
}

/// Validates a caller-supplied document number.
pub fn validate_document_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();

    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "number".to_string(),
        });
    }
    if number.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "number".to_string(),
            max: 20,
        });
    }
    Ok(())
}

/// Validates a username: lowercase alphanumeric plus dots and underscores.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }
    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, and underscores".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Sale Request Validation
// =============================================================================

/// Validates a whole sale request against its document kind.
///
/// Checks run before the transaction opens:
/// - invoices require the buyer block, receipts must not carry one
/// - every line needs a product reference, a positive quantity, and a
///   non-negative price override when one is supplied
///
/// Product existence is NOT checked here; that happens inside the
/// transaction where it can be answered consistently.
pub fn validate_new_sale(kind: DocumentKind, sale: &NewSale) -> CoreResult<()> {
    match (kind, &sale.buyer) {
        (DocumentKind::Invoice, None) => {
            return Err(ValidationError::Required {
                field: "buyer".to_string(),
            }
            .into());
        }
        (DocumentKind::Receipt, Some(_)) => {
            return Err(CoreError::InvalidHeader {
                kind: kind.to_string(),
                reason: "a receipt cannot carry buyer identification".to_string(),
            });
        }
        (DocumentKind::Invoice, Some(buyer)) => {
            for (value, field) in [
                (&buyer.tax_id, "buyer.taxId"),
                (&buyer.legal_name, "buyer.legalName"),
                (&buyer.activity, "buyer.activity"),
                (&buyer.address, "buyer.address"),
            ] {
                if value.trim().is_empty() {
                    return Err(ValidationError::Required {
                        field: field.to_string(),
                    }
                    .into());
                }
            }
        }
        (DocumentKind::Receipt, None) => {}
    }

    if let Some(number) = &sale.number {
        validate_document_number(number)?;
    }

    for line in &sale.lines {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "productId".to_string(),
            }
            .into());
        }
        validate_quantity(line.quantity)?;
        if let Some(price) = line.unit_price {
            validate_unit_price(price)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvoiceBuyer, NewSaleLine};

    fn buyer() -> InvoiceBuyer {
        InvoiceBuyer {
            tax_id: "76.543.210-K".to_string(),
            legal_name: "Comercial Andina SpA".to_string(),
            activity: "Retail".to_string(),
            address: "Av. Siempre Viva 742".to_string(),
        }
    }

    fn line(qty: i64) -> NewSaleLine {
        NewSaleLine {
            product_id: "p-1".to_string(),
            quantity: qty,
            unit_price: None,
        }
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_LINE_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_LINE_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_unit_price_zero_allowed() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_sku_rules() {
        assert!(validate_sku("COKE-330").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("WAY-TOO-LONG-SKU").is_err());
        assert!(validate_sku("bad sku!").is_err());
    }

    #[test]
    fn test_invoice_requires_buyer() {
        let sale = NewSale {
            number: None,
            buyer: None,
            lines: vec![line(1)],
        };
        assert!(validate_new_sale(DocumentKind::Invoice, &sale).is_err());
        assert!(validate_new_sale(DocumentKind::Receipt, &sale).is_ok());
    }

    #[test]
    fn test_receipt_rejects_buyer() {
        let sale = NewSale {
            number: None,
            buyer: Some(buyer()),
            lines: vec![],
        };
        assert!(validate_new_sale(DocumentKind::Receipt, &sale).is_err());
        assert!(validate_new_sale(DocumentKind::Invoice, &sale).is_ok());
    }

    #[test]
    fn test_blank_buyer_field_rejected() {
        let mut b = buyer();
        b.legal_name = "  ".to_string();
        let sale = NewSale {
            number: None,
            buyer: Some(b),
            lines: vec![],
        };
        assert!(validate_new_sale(DocumentKind::Invoice, &sale).is_err());
    }

    #[test]
    fn test_zero_quantity_line_rejected() {
        let sale = NewSale {
            number: None,
            buyer: None,
            lines: vec![line(1), line(0)],
        };
        assert!(validate_new_sale(DocumentKind::Receipt, &sale).is_err());
    }

    #[test]
    fn test_empty_line_list_is_valid() {
        let sale = NewSale {
            number: None,
            buyer: None,
            lines: vec![],
        };
        assert!(validate_new_sale(DocumentKind::Receipt, &sale).is_ok());
    }
}
