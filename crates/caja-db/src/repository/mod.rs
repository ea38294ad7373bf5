//! # Repository Modules
//!
//! One repository per aggregate, all thin wrappers around the shared
//! connection pool.

pub mod product;
pub mod sale;
pub mod session;
pub mod user;

pub use product::ProductRepository;
pub use sale::{DailyReport, SaleRepository};
pub use session::SessionRepository;
pub use user::UserRepository;
