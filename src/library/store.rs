//! In-memory store of content items.
//!
//! Ids come from a single counter shared by every kind of content, so audio
//! and audiovisual items interleave in one sequence. The store-wide lock is
//! only held for id assignment, insertion and lookup; each item carries its
//! own mutex so ratings on different items never contend.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use super::content::{ContentId, ContentItem, NewContent};
use super::ratings::{RatingReceipt, Score};
use crate::domain::{CatalogError, CatalogResult, UserId};

struct StoreInner {
    /// Keyed by id; ids are handed out in insertion order
    items: BTreeMap<ContentId, Arc<Mutex<ContentItem>>>,

    next_id: u64,
}

/// Authoritative collection of content items
pub struct ContentStore {
    inner: RwLock<StoreInner>,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore {
    /// Create an empty store; the first id handed out is 1
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                items: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Validate and insert a new item, returning its id
    pub fn add(&self, request: NewContent) -> CatalogResult<ContentId> {
        request.validate()?;

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let id = ContentId(inner.next_id);
        inner.next_id += 1;

        let item = ContentItem::from_request(id, request);
        info!(content_id = %id, title = %item.title, kind = %item.kind, "Content added");
        inner.items.insert(id, Arc::new(Mutex::new(item)));

        Ok(id)
    }

    /// Snapshot of one item
    pub fn get(&self, id: ContentId) -> CatalogResult<ContentItem> {
        let slot = self.slot(id)?;
        let item = lock_item(&slot);
        Ok(item.clone())
    }

    /// Snapshot of every item in insertion order
    pub fn list_all(&self) -> Vec<ContentItem> {
        let slots: Vec<_> = {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            inner.items.values().cloned().collect()
        };

        slots.iter().map(|slot| lock_item(slot).clone()).collect()
    }

    /// Record `user`'s score for an item and refresh its average.
    ///
    /// The item is resolved before the score is parsed, so an unknown id
    /// wins over a malformed score. Nothing is written unless every check
    /// passes.
    pub fn rate(
        &self,
        id: ContentId,
        user: UserId,
        raw_score: &str,
    ) -> CatalogResult<RatingReceipt> {
        let slot = self.slot(id)?;
        let score = Score::parse(raw_score)?;

        let mut item = lock_item(&slot);
        let previous = item.ratings.record(user, score);

        debug!(
            content_id = %id,
            user_id = %user,
            score = score.value(),
            replaced = previous.is_some(),
            average = item.average_rating(),
            "Rating recorded"
        );

        Ok(RatingReceipt {
            content_id: id,
            title: item.title.clone(),
            score,
            user_id: user,
            previous,
            average: item.average_rating(),
            rating_count: item.rating_count(),
        })
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: ContentId) -> CatalogResult<Arc<Mutex<ContentItem>>> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Content", id))
    }
}

// Item mutations validate before writing, so a poisoned guard still holds
// a consistent item.
fn lock_item(slot: &Mutex<ContentItem>) -> MutexGuard<'_, ContentItem> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
