//! # Caja POS Database Layer
//!
//! SQLite persistence for the Caja POS backend, built on SQLx.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        caja-db                          │
//! │                                                         │
//! │  ┌──────────┐   ┌────────────────────────────────────┐  │
//! │  │ Database │──▶│ ProductRepository  UserRepository  │  │
//! │  │  (pool)  │   │ SaleRepository     SessionRepository│ │
//! │  └──────────┘   └────────────────────────────────────┘  │
//! │        │                                                │
//! │        ▼                                                │
//! │  SQLite file (WAL) + embedded migrations                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Domain types and arithmetic come from `caja-core`; this crate only
//! stores and retrieves them. Amounts are persisted as integer cents.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    DailyReport, ProductRepository, SaleRepository, SessionRepository, UserRepository,
};
