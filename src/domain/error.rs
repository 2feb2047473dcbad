//! Error type shared by every catalog operation.

use thiserror::Error;

/// Errors returned by the catalog core.
///
/// Every variant is recoverable: the caller reports it and re-prompts. A
/// failed operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Malformed or out-of-range input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No entity with the given key
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The classification table does not know a label it was asked about
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The viewer's classification does not admit the item
    #[error("Content {content_id} requires a minimum age of {required_age}")]
    AccessDenied { content_id: u64, required_age: u32 },

    /// Email matched an account but the password did not
    #[error("Incorrect password")]
    Authentication,
}

impl CatalogError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True for the input-shape errors a prompt loop should re-ask for
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
