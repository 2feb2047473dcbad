//! Per-item rating ledger.
//!
//! Each user holds at most one score per item. Recording a score for a user
//! who already rated the item replaces the old value; no history is kept.
//! The mean is recomputed inside every mutation, so a ledger handed back to
//! a caller never carries a stale average.

use std::collections::HashMap;

use serde::Serialize;

use super::content::ContentId;
use crate::domain::{CatalogError, CatalogResult, UserId};

/// Lowest accepted score
pub const MIN_SCORE: f64 = 1.0;

/// Highest accepted score
pub const MAX_SCORE: f64 = 10.0;

/// A validated score in [`MIN_SCORE`, `MAX_SCORE`]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Score(f64);

impl Score {
    /// Validate a numeric score
    pub fn new(value: f64) -> CatalogResult<Self> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(CatalogError::validation("score out of range"));
        }
        Ok(Self(value))
    }

    /// Parse operator input such as `7.5` or `7,5`.
    ///
    /// Only the first comma is treated as the decimal separator.
    pub fn parse(raw: &str) -> CatalogResult<Self> {
        let normalized = raw.trim().replacen(',', ".", 1);
        let value: f64 = normalized
            .parse()
            .map_err(|_| CatalogError::validation("invalid score format"))?;

        if !value.is_finite() {
            return Err(CatalogError::validation("invalid score format"));
        }
        Self::new(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// One score per user, plus the derived mean
#[derive(Debug, Clone, Default)]
pub struct RatingLedger {
    scores: HashMap<UserId, f64>,
    average: f64,
}

impl RatingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `user`'s score; returns the replaced value
    pub fn record(&mut self, user: UserId, score: Score) -> Option<f64> {
        let previous = self.scores.insert(user, score.value());
        self.recompute();
        previous
    }

    pub fn score_of(&self, user: UserId) -> Option<f64> {
        self.scores.get(&user).copied()
    }

    /// Arithmetic mean of all scores, 0.0 when empty
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries ordered by user id
    pub fn entries(&self) -> Vec<(UserId, f64)> {
        let mut entries: Vec<_> = self.scores.iter().map(|(u, s)| (*u, *s)).collect();
        entries.sort_by_key(|(user, _)| *user);
        entries
    }

    fn recompute(&mut self) {
        self.average = if self.scores.is_empty() {
            0.0
        } else {
            self.scores.values().sum::<f64>() / self.scores.len() as f64
        };
    }
}

/// Outcome of a successful rating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingReceipt {
    pub content_id: ContentId,
    pub title: String,
    pub score: Score,
    pub user_id: UserId,

    /// Score this user had given before, if any
    pub previous: Option<f64>,

    /// Average after the update
    pub average: f64,

    pub rating_count: usize,
}

impl std::fmt::Display for RatingReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' rated {} by user {}",
            self.title, self.score, self.user_id
        )
    }
}
