//! Core catalog logic.
//!
//! This module contains:
//! - Catalog: the facade every caller goes through
//! - Accounts: user directory and registration rules
//! - Access: the per-viewer visibility gate

pub mod access;
pub mod accounts;
pub mod catalog;

// Re-export commonly used types
pub use access::Viewer;
pub use accounts::{AccountPolicy, UserDirectory};
pub use catalog::Catalog;
