//! Age classification reference table and the access classifier.
//!
//! The table is fixed: three labels, always presented in the same order and
//! numbered 1..N for menu selection. It is built once per process and never
//! changes afterwards.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::error::{CatalogError, CatalogResult};

static STANDARD_TABLE: OnceLock<ClassificationTable> = OnceLock::new();

/// Age classification carried by content items and user accounts
///
/// Serialized as its [`AgeRating::code`], so JSON, YAML and text agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeRating {
    /// Suitable for all audiences
    #[serde(rename = "general")]
    General,

    /// Viewers 13 and older
    #[serde(rename = "teen-13+", alias = "teen")]
    Teen,

    /// Viewers 18 and older
    #[serde(rename = "adult-18+", alias = "adult")]
    Adult,
}

impl AgeRating {
    /// Stable code used in listings and on the command line
    pub fn code(&self) -> &'static str {
        match self {
            AgeRating::General => "general",
            AgeRating::Teen => "teen-13+",
            AgeRating::Adult => "adult-18+",
        }
    }
}

impl std::fmt::Display for AgeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for AgeRating {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" | "g" | "all" => Ok(AgeRating::General),
            "teen-13+" | "teen" | "13+" => Ok(AgeRating::Teen),
            "adult-18+" | "adult" | "18+" => Ok(AgeRating::Adult),
            _ => Err(CatalogError::validation(format!(
                "unknown age classification: {}",
                s
            ))),
        }
    }
}

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationLabel {
    pub rating: AgeRating,

    /// Human-readable name
    pub name: &'static str,

    pub description: &'static str,

    /// Youngest age admitted
    pub min_age: u32,
}

/// Ordered reference table of classification labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationTable {
    labels: Vec<ClassificationLabel>,
}

impl Default for ClassificationTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassificationTable {
    /// The platform's reference table
    pub fn standard() -> Self {
        Self::from_labels(vec![
            ClassificationLabel {
                rating: AgeRating::General,
                name: "General",
                description: "Suitable for all audiences",
                min_age: 0,
            },
            ClassificationLabel {
                rating: AgeRating::Teen,
                name: "Teen",
                description: "Suitable for viewers 13 and older",
                min_age: 13,
            },
            ClassificationLabel {
                rating: AgeRating::Adult,
                name: "Adult",
                description: "Restricted to viewers 18 and older",
                min_age: 18,
            },
        ])
    }

    /// Shared process-wide copy of the standard table
    pub fn global() -> &'static ClassificationTable {
        STANDARD_TABLE.get_or_init(Self::standard)
    }

    /// Build a table from explicit rows, keeping their order
    pub fn from_labels(labels: Vec<ClassificationLabel>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[ClassificationLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Rows paired with their 1-based menu number
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &ClassificationLabel)> {
        self.labels.iter().enumerate().map(|(i, label)| (i + 1, label))
    }

    /// Resolve a 1-based menu selection
    pub fn by_menu_index(&self, index: usize) -> CatalogResult<&ClassificationLabel> {
        index
            .checked_sub(1)
            .and_then(|i| self.labels.get(i))
            .ok_or_else(|| {
                CatalogError::validation(format!(
                    "invalid classification selection {} (expected 1-{})",
                    index,
                    self.labels.len()
                ))
            })
    }

    pub fn contains(&self, rating: AgeRating) -> bool {
        self.labels.iter().any(|label| label.rating == rating)
    }

    /// Look up the row for a rating.
    ///
    /// A missing row means the table was built without it, which is a
    /// configuration fault rather than bad input.
    pub fn lookup(&self, rating: AgeRating) -> CatalogResult<&ClassificationLabel> {
        self.labels
            .iter()
            .find(|label| label.rating == rating)
            .ok_or_else(|| {
                CatalogError::Configuration(format!(
                    "classification '{}' missing from reference table",
                    rating
                ))
            })
    }

    pub fn min_age(&self, rating: AgeRating) -> CatalogResult<u32> {
        Ok(self.lookup(rating)?.min_age)
    }

    /// Whether a viewer of `user_age` may see content classified `rating`
    pub fn can_access(&self, user_age: u32, rating: AgeRating) -> CatalogResult<bool> {
        Ok(user_age >= self.min_age(rating)?)
    }

    /// Parse free text into a rating that this table knows about
    pub fn parse_label(&self, text: &str) -> CatalogResult<AgeRating> {
        let trimmed = text.trim();
        let rating = match self
            .labels
            .iter()
            .find(|label| label.name.eq_ignore_ascii_case(trimmed))
        {
            Some(label) => label.rating,
            None => trimmed.parse::<AgeRating>()?,
        };

        if !self.contains(rating) {
            return Err(CatalogError::validation(format!(
                "classification '{}' is not offered",
                rating
            )));
        }
        Ok(rating)
    }
}
