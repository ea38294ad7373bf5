//! # caja-core: Pure Business Logic for Caja POS
//!
//! This crate is the heart of Caja POS. It contains all business logic as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caja POS Architecture                       │
//! │                                                                 │
//! │  ┌───────────────────────────────────────────────────────────┐ │
//! │  │                  apps/api (axum REST)                     │ │
//! │  │  products • users • receipts • invoices • session         │ │
//! │  └────────────────────────────┬──────────────────────────────┘ │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐ │
//! │  │              ★ caja-core (THIS CRATE) ★                   │ │
//! │  │                                                           │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐      │ │
//! │  │  │  types  │ │  money  │ │ totals  │ │ validation │      │ │
//! │  │  └─────────┘ └─────────┘ └─────────┘ └────────────┘      │ │
//! │  │                                                           │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS      │ │
//! │  └────────────────────────────┬──────────────────────────────┘ │
//! │                               │                                 │
//! │  ┌────────────────────────────▼──────────────────────────────┐ │
//! │  │                caja-db (Database Layer)                   │ │
//! │  │     SQLite queries, migrations, repositories              │ │
//! │  └───────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, same input = same output
//! 2. **No I/O**: database, network, file system access is forbidden here
//! 3. **Integer Money**: all monetary values are cents (i64), serialized as
//!    exact decimal strings; floats never appear
//! 4. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example
//!
//! ```rust
//! use caja_core::money::Money;
//! use caja_core::totals::SaleTotals;
//!
//! let net: Money = "3500.00".parse().unwrap();
//! let totals = SaleTotals::from_net(net).unwrap();
//!
//! assert_eq!(totals.tax.to_string(), "665.00");
//! assert_eq!(totals.total.to_string(), "4165.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to write `use caja_core::Money` instead of
// `use caja_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use totals::{line_subtotal, SaleTotals};
pub use types::*;
