//! Domain types for the catalog.
//!
//! This module contains:
//! - Classification: the age-rating reference table and access check
//! - User: accounts and plans
//! - Error: the error type returned by every core operation

pub mod classification;
pub mod error;
pub mod user;

// Re-export commonly used types
pub use classification::{AgeRating, ClassificationLabel, ClassificationTable};
pub use error::{CatalogError, CatalogResult};
pub use user::{NewUser, Plan, User, UserId};
