//! Content items held by the catalog.
//!
//! Audiovisual and audio entries share one model; the medium is derived
//! from the kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ratings::RatingLedger;
use crate::domain::{AgeRating, CatalogError, CatalogResult};

/// Content identifier, assigned sequentially from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub u64);

impl ContentId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ContentId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ContentId)
            .map_err(|_| CatalogError::validation(format!("invalid content id: {}", s)))
    }
}

/// Coarse medium tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Medium {
    Audiovisual,
    Audio,
}

impl std::fmt::Display for Medium {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Medium::Audiovisual => write!(f, "audiovisual"),
            Medium::Audio => write!(f, "audio"),
        }
    }
}

/// Kind of content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Movie,
    Series,
    Documentary,

    /// Music track
    Music,

    Podcast,
    Audiobook,
}

impl ContentKind {
    /// Every kind, in menu order
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Movie,
        ContentKind::Series,
        ContentKind::Documentary,
        ContentKind::Music,
        ContentKind::Podcast,
        ContentKind::Audiobook,
    ];

    pub fn medium(&self) -> Medium {
        match self {
            ContentKind::Movie | ContentKind::Series | ContentKind::Documentary => {
                Medium::Audiovisual
            }
            ContentKind::Music | ContentKind::Podcast | ContentKind::Audiobook => Medium::Audio,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Series => write!(f, "series"),
            ContentKind::Documentary => write!(f, "documentary"),
            ContentKind::Music => write!(f, "music"),
            ContentKind::Podcast => write!(f, "podcast"),
            ContentKind::Audiobook => write!(f, "audiobook"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "film" => Ok(ContentKind::Movie),
            "series" | "show" => Ok(ContentKind::Series),
            "documentary" | "doc" => Ok(ContentKind::Documentary),
            "music" | "track" | "song" => Ok(ContentKind::Music),
            "podcast" => Ok(ContentKind::Podcast),
            "audiobook" => Ok(ContentKind::Audiobook),
            _ => Err(CatalogError::validation(format!(
                "unknown content kind: {}",
                s
            ))),
        }
    }
}

/// Request to add an item to the catalog
#[derive(Debug, Clone)]
pub struct NewContent {
    pub title: String,
    pub kind: ContentKind,
    pub duration_minutes: u32,
    pub classification: AgeRating,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<u16>,
}

impl NewContent {
    pub fn new(
        title: impl Into<String>,
        kind: ContentKind,
        duration_minutes: u32,
        classification: AgeRating,
    ) -> Self {
        Self {
            title: title.into(),
            kind,
            duration_minutes,
            classification,
            genre: None,
            description: None,
            release_year: None,
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_release_year(mut self, year: u16) -> Self {
        self.release_year = Some(year);
        self
    }

    /// Check the shape of the request; returns the trimmed title
    pub fn validate(&self) -> CatalogResult<&str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CatalogError::validation("title must not be empty"));
        }
        if self.duration_minutes == 0 {
            return Err(CatalogError::validation(
                "duration must be a positive number of minutes",
            ));
        }
        Ok(title)
    }
}

/// A catalog entry with its rating ledger
#[derive(Debug, Clone)]
pub struct ContentItem {
    pub id: ContentId,

    pub title: String,

    pub kind: ContentKind,

    /// Length in minutes, always positive
    pub duration_minutes: u32,

    pub classification: AgeRating,

    pub genre: Option<String>,

    pub description: Option<String>,

    pub release_year: Option<u16>,

    /// When the item entered the catalog
    pub added_at: DateTime<Utc>,

    pub ratings: RatingLedger,
}

impl ContentItem {
    /// Build a fresh item from a request that already passed validation
    pub(crate) fn from_request(id: ContentId, request: NewContent) -> Self {
        Self {
            id,
            title: request.title.trim().to_string(),
            kind: request.kind,
            duration_minutes: request.duration_minutes,
            classification: request.classification,
            genre: request.genre.filter(|g| !g.trim().is_empty()),
            description: request.description.filter(|d| !d.trim().is_empty()),
            release_year: request.release_year,
            added_at: Utc::now(),
            ratings: RatingLedger::new(),
        }
    }

    pub fn medium(&self) -> Medium {
        self.kind.medium()
    }

    pub fn average_rating(&self) -> f64 {
        self.ratings.average()
    }

    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    pub fn listing(&self) -> ContentListing {
        ContentListing {
            id: self.id,
            title: self.title.clone(),
            kind: self.kind,
            medium: self.medium(),
            genre: self.genre.clone(),
            duration_minutes: self.duration_minutes,
            classification: self.classification,
            average_rating: self.average_rating(),
            rating_count: self.rating_count(),
        }
    }
}

/// Display projection of a content item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentListing {
    pub id: ContentId,
    pub title: String,
    pub kind: ContentKind,
    pub medium: Medium,
    pub genre: Option<String>,
    pub duration_minutes: u32,
    pub classification: AgeRating,
    pub average_rating: f64,
    pub rating_count: usize,
}
