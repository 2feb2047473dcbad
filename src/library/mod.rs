//! Content library: items, the store that owns them, and their ratings.
//!
//! # Layout
//!
//! ```text
//! ContentStore
//! └── ContentId -> Mutex<ContentItem>
//!                  └── RatingLedger   # UserId -> score, cached mean
//! ```

pub mod content;
pub mod ratings;
pub mod store;

pub use content::{ContentId, ContentItem, ContentKind, ContentListing, Medium, NewContent};
pub use ratings::{RatingLedger, RatingReceipt, Score, MAX_SCORE, MIN_SCORE};
pub use store::ContentStore;
