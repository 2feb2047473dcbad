//! streamcat - in-memory streaming catalog
//!
//! Keeps audiovisual and audio content in one catalog, collects one score
//! per user per item, and filters what each signed-in viewer may see by
//! age classification.
//!
//! # Architecture
//!
//! Everything lives in memory for the life of the process:
//! - Items get ids from a single counter shared by every kind
//! - Each item carries its own rating ledger behind its own lock
//! - The average is recomputed on every rating, never derived lazily
//!
//! # Modules
//!
//! - `domain`: Users, age classifications, errors
//! - `library`: Content items, scores and the content store
//! - `core`: Catalog facade, account rules, access gate
//! - `cli`: Command-line interface and interactive shell
//!
//! # Usage
//!
//! ```bash
//! # Start the shell with sample data
//! streamcat shell --demo
//!
//! # Show the classification table
//! streamcat classifications --json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod library;

// Re-export main types at crate root for convenience
pub use core::{Catalog, Viewer};
pub use domain::{AgeRating, CatalogError, CatalogResult, ClassificationTable, User, UserId};
pub use library::{ContentId, ContentItem, ContentKind, NewContent, RatingReceipt, Score};
