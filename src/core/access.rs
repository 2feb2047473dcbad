//! Who may see which content.
//!
//! Guests are not represented here: they browse the full catalog and never
//! reach these checks. For a signed-in viewer an item is admitted when both
//! the viewer's age and the classification they declared at registration
//! reach the item's threshold. Administrators are admitted everywhere.

use serde::Serialize;

use crate::domain::{AgeRating, CatalogError, CatalogResult, ClassificationTable, User, UserId};
use crate::library::ContentItem;

/// The access-relevant view of a signed-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub user_id: UserId,
    pub age: u32,

    /// Declared certification
    pub age_rating: AgeRating,

    pub is_admin: bool,
}

impl From<&User> for Viewer {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            age: user.age,
            age_rating: user.age_rating,
            is_admin: user.is_admin,
        }
    }
}

impl Viewer {
    /// Whether this viewer may see content classified `classification`
    pub fn admits(
        &self,
        table: &ClassificationTable,
        classification: AgeRating,
    ) -> CatalogResult<bool> {
        if self.is_admin {
            return Ok(true);
        }

        let by_age = table.can_access(self.age, classification)?;
        let by_declaration = table.min_age(classification)? <= table.min_age(self.age_rating)?;
        Ok(by_age && by_declaration)
    }

    /// Like [`Viewer::admits`], but a refusal becomes `AccessDenied`
    pub fn check(&self, table: &ClassificationTable, item: &ContentItem) -> CatalogResult<()> {
        if self.admits(table, item.classification)? {
            return Ok(());
        }

        Err(CatalogError::AccessDenied {
            content_id: item.id.get(),
            required_age: table.min_age(item.classification)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(age: u32, age_rating: AgeRating) -> Viewer {
        Viewer {
            user_id: UserId(1),
            age,
            age_rating,
            is_admin: false,
        }
    }

    #[test]
    fn test_age_gate() {
        let table = ClassificationTable::standard();
        let teen = viewer(15, AgeRating::Adult);

        assert!(teen.admits(&table, AgeRating::General).unwrap());
        assert!(teen.admits(&table, AgeRating::Teen).unwrap());
        assert!(!teen.admits(&table, AgeRating::Adult).unwrap());
    }

    #[test]
    fn test_declared_rating_caps_access() {
        let table = ClassificationTable::standard();
        let cautious_adult = viewer(40, AgeRating::Teen);

        assert!(cautious_adult.admits(&table, AgeRating::Teen).unwrap());
        assert!(!cautious_adult.admits(&table, AgeRating::Adult).unwrap());
    }

    #[test]
    fn test_admin_sees_everything() {
        let table = ClassificationTable::standard();
        let admin = Viewer {
            is_admin: true,
            ..viewer(13, AgeRating::General)
        };

        assert!(admin.admits(&table, AgeRating::Adult).unwrap());
    }

    #[test]
    fn test_unknown_label_propagates() {
        let table = ClassificationTable::from_labels(
            ClassificationTable::standard().labels()[..2].to_vec(),
        );
        let err = viewer(30, AgeRating::Teen)
            .admits(&table, AgeRating::Adult)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }
}
