//! Data layer module
//!
//! Stand-in for the managed relational backend:
//! - Tournament settings
//! - Registrations

mod models;
mod store;

pub use models::*;
pub use store::Store;
