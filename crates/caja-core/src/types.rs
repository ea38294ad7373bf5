//! # Domain Types
//!
//! Core domain types used throughout Caja POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                            │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐      │
//! │  │   Product    │  │     Sale     │  │     SaleLine     │      │
//! │  │ ────────────  │  │ ────────────  │  │ ────────────────  │      │
//! │  │ id (UUID)    │  │ id (UUID)    │  │ (sale_kind, id)  │      │
//! │  │ sku          │  │ kind + number│  │ product ref      │      │
//! │  │ price        │  │ net/tax/total│  │ qty × unit price │      │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘      │
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐      │
//! │  │     Role     │  │ DocumentKind │  │  SessionState    │      │
//! │  │  Admin       │  │  Receipt     │  │  is_open         │      │
//! │  │  Seller      │  │  Invoice     │  │  updated_at      │      │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tagged Sale Reference
//! A line item references its owning document through a `(DocumentKind, id)`
//! pair instead of one nullable foreign key per document table. Exactly one
//! document owns each line; deleting the document deletes its lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points (1 bps = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The system-wide IVA rate: 19%.
    pub const IVA: TaxRate = TaxRate(1900);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }
}

// =============================================================================
// Roles and Capabilities
// =============================================================================

/// What an authenticated user is allowed to do.
///
/// Authorization checks compare capabilities, never role names, so adding a
/// role cannot silently disable an endpoint through a typo'd string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create, edit and delete products.
    ManageProducts,
    /// Create, edit and delete user accounts.
    ManageUsers,
    /// Issue receipts and invoices.
    CreateSales,
    /// View aggregated sales reports.
    ViewReports,
    /// Open and close the sales session.
    ControlSession,
}

/// Closed set of user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every operation.
    Admin,
    /// Day-to-day register work: products, sales, session control.
    Seller,
}

impl Role {
    /// The capability set granted to this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::Admin => &[
                Capability::ManageProducts,
                Capability::ManageUsers,
                Capability::CreateSales,
                Capability::ViewReports,
                Capability::ControlSession,
            ],
            Role::Seller => &[
                Capability::ManageProducts,
                Capability::CreateSales,
                Capability::ControlSession,
            ],
        }
    }

    /// Checks whether this role grants a capability.
    pub fn can(&self, cap: Capability) -> bool {
        self.capabilities().contains(&cap)
    }

    /// Stable storage/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Seller => "seller",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "seller" => Ok(Role::Seller),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// =============================================================================
// Document Kind
// =============================================================================

/// Discriminant for the two sale document variants.
///
/// Line items carry this tag next to the document id, forming the tagged
/// reference described in the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Boleta: anonymous point-of-sale receipt.
    Receipt,
    /// Factura: invoice with the buyer's legal identification.
    Invoice,
}

impl DocumentKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Receipt => "receipt",
            DocumentKind::Invoice => "invoice",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// Referenced, never owned, by sale lines. Stock is informational: it may go
/// negative and is not checked at sale time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Optional short business code.
    pub sku: Option<String>,

    /// Display name shown on receipts.
    pub name: String,

    /// Unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    /// Current stock level. Informational only.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A user account with a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,

    /// Argon2 hash; never serialized outward.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Documents
// =============================================================================

/// The buyer identification block an invoice carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceBuyer {
    /// Buyer tax id (RUT).
    pub tax_id: String,
    /// Registered legal name.
    pub legal_name: String,
    /// Declared business activity.
    pub activity: String,
    /// Registered address.
    pub address: String,
}

/// A persisted sale document with its line items.
///
/// Totals are computed once at creation and never recalculated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub kind: DocumentKind,

    /// Document number, unique per variant.
    pub number: String,

    /// Issuing user.
    pub user_id: String,

    /// Present exactly when `kind == Invoice`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer: Option<InvoiceBuyer>,

    pub net: Money,
    pub tax: Money,
    pub total: Money,

    /// Set once at creation, immutable.
    pub created_at: DateTime<Utc>,

    pub lines: Vec<SaleLine>,
}

/// One line of a sale document.
///
/// The unit price is copied at sale time; later product price changes do not
/// rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub id: String,

    /// Tagged reference to the owning document.
    pub sale_kind: DocumentKind,
    pub sale_id: String,

    pub product_id: String,

    /// Product name snapshot for receipt rendering.
    pub product_name: String,

    /// Zero-based input order within the sale.
    pub position: i64,

    pub quantity: i64,

    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_price_cents"))]
    pub unit_price: Money,

    /// quantity × unit price, exact.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    pub subtotal: Money,
}

// =============================================================================
// Session State
// =============================================================================

/// The single global sales-session flag.
///
/// Exactly one row exists system-wide; every read and write addresses that
/// row. Initial state is closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_open: bool,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sale Creation Requests
// =============================================================================

/// A requested line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleLine {
    pub product_id: String,

    /// Must be at least 1.
    pub quantity: i64,

    /// Optional price override. When absent the product's current price is
    /// copied; when present it is honored only if the override policy
    /// allows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
}

/// A requested sale document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    /// Document number. Generated when absent; rejected as a conflict when
    /// it collides with an existing document of the same kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    /// Required for invoices, forbidden for receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<InvoiceBuyer>,

    /// Ordered line items. An empty list is allowed and yields a
    /// zero-total document.
    pub lines: Vec<NewSaleLine>,
}

// =============================================================================
// Unit Tests
// =============================================================================
