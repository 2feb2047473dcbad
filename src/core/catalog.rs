//! Catalog facade.
//!
//! The only surface the shell (or any other caller) uses. It owns the
//! classification table, the content store and the user directory, and
//! routes every mutation through them.

use tracing::warn;

use super::access::Viewer;
use super::accounts::{AccountPolicy, UserDirectory};
use crate::domain::{
    AgeRating, CatalogError, CatalogResult, ClassificationTable, NewUser, Plan, User, UserId,
};
use crate::library::{ContentId, ContentItem, ContentStore, NewContent, RatingReceipt};

/// Content, ratings and accounts for one process
pub struct Catalog {
    table: ClassificationTable,
    content: ContentStore,
    users: UserDirectory,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(AccountPolicy::default())
    }
}

impl Catalog {
    /// Create an empty catalog over the standard classification table
    pub fn new(policy: AccountPolicy) -> Self {
        Self::with_table(ClassificationTable::global().clone(), policy)
    }

    /// Create an empty catalog over a specific classification table
    pub fn with_table(table: ClassificationTable, policy: AccountPolicy) -> Self {
        Self {
            table,
            content: ContentStore::new(),
            users: UserDirectory::new(policy),
        }
    }

    pub fn classifications(&self) -> &ClassificationTable {
        &self.table
    }

    pub fn account_policy(&self) -> &AccountPolicy {
        self.users.policy()
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Add an item; returns its id
    pub fn add_content(&self, request: NewContent) -> CatalogResult<ContentId> {
        self.ensure_offered(request.classification)?;
        self.content.add(request)
    }

    pub fn get_by_id(&self, id: ContentId) -> CatalogResult<ContentItem> {
        self.content.get(id)
    }

    /// Every item in insertion order, unfiltered
    pub fn list_all(&self) -> Vec<ContentItem> {
        self.content.list_all()
    }

    /// Items the viewer may see, in insertion order.
    ///
    /// `None` is a guest and sees everything. Items whose classification
    /// cannot be resolved are hidden.
    pub fn list_visible<'a>(
        &'a self,
        viewer: Option<&'a Viewer>,
    ) -> impl Iterator<Item = ContentItem> + 'a {
        self.content
            .list_all()
            .into_iter()
            .filter(move |item| match viewer {
                None => true,
                Some(viewer) => match viewer.admits(&self.table, item.classification) {
                    Ok(admitted) => admitted,
                    Err(e) => {
                        warn!(content_id = %item.id, error = %e, "Hiding item");
                        false
                    }
                },
            })
    }

    /// Fetch one item on behalf of a viewer
    pub fn view_as(&self, viewer: Option<&Viewer>, id: ContentId) -> CatalogResult<ContentItem> {
        let item = self.content.get(id)?;
        if let Some(viewer) = viewer {
            self.check_access(viewer, &item)?;
        }
        Ok(item)
    }

    /// Record a score for `user`, overwriting any earlier one
    pub fn rate(
        &self,
        content_id: ContentId,
        user: UserId,
        raw_score: &str,
    ) -> CatalogResult<RatingReceipt> {
        self.content.rate(content_id, user, raw_score)
    }

    /// Rate on behalf of a signed-in viewer, enforcing the access gate
    pub fn rate_as(
        &self,
        viewer: &Viewer,
        content_id: ContentId,
        raw_score: &str,
    ) -> CatalogResult<RatingReceipt> {
        let item = self.content.get(content_id)?;
        self.check_access(viewer, &item)?;
        self.content.rate(content_id, viewer.user_id, raw_score)
    }

    /// Whether a viewer of `user_age` may see content classified `rating`
    pub fn can_access(&self, user_age: u32, rating: AgeRating) -> CatalogResult<bool> {
        self.table.can_access(user_age, rating)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub fn register(&self, request: NewUser) -> CatalogResult<User> {
        self.ensure_offered(request.age_rating)?;
        self.users.register(request)
    }

    pub fn add_admin(&self, request: NewUser) -> CatalogResult<User> {
        self.ensure_offered(request.age_rating)?;
        self.users.add_admin(request)
    }

    pub fn login(&self, email: &str, password: &str) -> CatalogResult<User> {
        self.users.authenticate(email, password)
    }

    pub fn user(&self, id: UserId) -> CatalogResult<User> {
        self.users.get(id)
    }

    pub fn find_user_by_email(&self, email: &str) -> CatalogResult<User> {
        self.users.find_by_email(email)
    }

    pub fn users(&self) -> Vec<User> {
        self.users.list()
    }

    pub fn set_plan(&self, id: UserId, plan: Plan) -> CatalogResult<User> {
        self.users.set_plan(id, plan)
    }

    fn ensure_offered(&self, rating: AgeRating) -> CatalogResult<()> {
        if self.table.contains(rating) {
            Ok(())
        } else {
            Err(CatalogError::validation(format!(
                "classification '{}' is not offered",
                rating
            )))
        }
    }

    fn check_access(&self, viewer: &Viewer, item: &ContentItem) -> CatalogResult<()> {
        let result = viewer.check(&self.table, item);
        if let Err(CatalogError::AccessDenied { .. }) = &result {
            warn!(user_id = %viewer.user_id, content_id = %item.id, "Access denied");
        }
        result
    }
}
