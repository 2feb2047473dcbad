//! Account directory.
//!
//! Users are keyed by a sequential id and looked up for login by email
//! (case-insensitive). Passwords are plaintext and compared by equality.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use chrono::Utc;
use tracing::info;

use crate::domain::{CatalogError, CatalogResult, NewUser, Plan, User, UserId};

/// Registration rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    pub min_age: u32,
    pub max_age: u32,
    pub min_password_len: usize,
    pub max_password_len: usize,
    pub default_plan: Plan,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            min_age: 13,
            max_age: 120,
            min_password_len: 6,
            max_password_len: 32,
            default_plan: Plan::Free,
        }
    }
}

impl AccountPolicy {
    /// Check a registration request against the rules
    pub fn validate(&self, request: &NewUser) -> CatalogResult<()> {
        if request.name.trim().is_empty() {
            return Err(CatalogError::validation("name must not be empty"));
        }
        if request.age < self.min_age || request.age > self.max_age {
            return Err(CatalogError::validation(format!(
                "age must be between {} and {}",
                self.min_age, self.max_age
            )));
        }

        let email = request.email.trim();
        if email.is_empty() {
            return Err(CatalogError::validation("email must not be empty"));
        }
        if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
            return Err(CatalogError::validation("invalid email format"));
        }

        let password_len = request.password.chars().count();
        if password_len < self.min_password_len || password_len > self.max_password_len {
            return Err(CatalogError::validation(format!(
                "password must be {}-{} characters",
                self.min_password_len, self.max_password_len
            )));
        }

        Ok(())
    }
}

struct DirectoryInner {
    users: BTreeMap<UserId, User>,

    /// Lowercased email -> id
    by_email: HashMap<String, UserId>,

    next_id: u64,
}

/// Registered users
pub struct UserDirectory {
    policy: AccountPolicy,
    inner: RwLock<DirectoryInner>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new(AccountPolicy::default())
    }
}

impl UserDirectory {
    pub fn new(policy: AccountPolicy) -> Self {
        Self {
            policy,
            inner: RwLock::new(DirectoryInner {
                users: BTreeMap::new(),
                by_email: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn policy(&self) -> &AccountPolicy {
        &self.policy
    }

    /// Register a regular account
    pub fn register(&self, request: NewUser) -> CatalogResult<User> {
        self.insert(request, false)
    }

    /// Register an administrator account
    pub fn add_admin(&self, request: NewUser) -> CatalogResult<User> {
        self.insert(request, true)
    }

    fn insert(&self, request: NewUser, is_admin: bool) -> CatalogResult<User> {
        self.policy.validate(&request)?;

        let email = request.email.trim().to_string();
        let key = email.to_lowercase();

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.by_email.contains_key(&key) {
            return Err(CatalogError::validation(format!(
                "email already registered: {}",
                email
            )));
        }

        let id = UserId(inner.next_id);
        inner.next_id += 1;

        let user = User {
            id,
            name: request.name.trim().to_string(),
            email,
            password: request.password,
            age: request.age,
            age_rating: request.age_rating,
            plan: request.plan.unwrap_or(self.policy.default_plan),
            is_admin,
            created_at: Utc::now(),
            last_login: None,
        };

        inner.by_email.insert(key, id);
        inner.users.insert(id, user.clone());
        info!(user_id = %id, admin = is_admin, "User registered");

        Ok(user)
    }

    /// Check credentials and stamp the login time
    pub fn authenticate(&self, email: &str, password: &str) -> CatalogResult<User> {
        let key = email.trim().to_lowercase();
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        let id = *inner
            .by_email
            .get(&key)
            .ok_or_else(|| CatalogError::not_found("User", email.trim()))?;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| CatalogError::not_found("User", id))?;

        if user.password != password {
            return Err(CatalogError::Authentication);
        }

        user.last_login = Some(Utc::now());
        info!(user_id = %id, "User logged in");
        Ok(user.clone())
    }

    pub fn get(&self, id: UserId) -> CatalogResult<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("User", id))
    }

    pub fn find_by_email(&self, email: &str) -> CatalogResult<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .by_email
            .get(&email.trim().to_lowercase())
            .and_then(|id| inner.users.get(id))
            .cloned()
            .ok_or_else(|| CatalogError::not_found("User", email.trim()))
    }

    /// All users in registration order
    pub fn list(&self) -> Vec<User> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.users.values().cloned().collect()
    }

    pub fn set_plan(&self, id: UserId, plan: Plan) -> CatalogResult<User> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| CatalogError::not_found("User", id))?;

        user.plan = plan;
        info!(user_id = %id, plan = %plan, "Plan changed");
        Ok(user.clone())
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .users
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgeRating;

    fn ana() -> NewUser {
        NewUser::new("Ana", "ana@example.com", "secret1", 30, AgeRating::Adult)
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let dir = UserDirectory::default();
        let first = dir.register(ana()).unwrap();
        let second = dir
            .register(NewUser::new("Luis", "luis@example.com", "secret2", 15, AgeRating::Teen))
            .unwrap();

        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));
        assert_eq!(first.plan, Plan::Free);
        assert!(!first.is_admin);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn test_registration_rules() {
        let dir = UserDirectory::default();

        let cases = [
            NewUser::new(" ", "a@b.c", "secret1", 30, AgeRating::Adult),
            NewUser::new("A", "", "secret1", 30, AgeRating::Adult),
            NewUser::new("A", "not-an-email", "secret1", 30, AgeRating::Adult),
            NewUser::new("A", "a@b.c", "short", 30, AgeRating::Adult),
            NewUser::new("A", "a@b.c", "x".repeat(33), 30, AgeRating::Adult),
            NewUser::new("A", "a@b.c", "secret1", 12, AgeRating::Adult),
            NewUser::new("A", "a@b.c", "secret1", 121, AgeRating::Adult),
        ];

        for request in cases {
            let err = dir.register(request.clone()).unwrap_err();
            assert!(err.is_validation(), "{request:?} should be rejected");
        }
        assert!(dir.is_empty());

        assert!(dir
            .register(NewUser::new("A", "a@b.c", "secret1", 13, AgeRating::General))
            .is_ok());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let dir = UserDirectory::default();
        dir.register(ana()).unwrap();

        let dup = NewUser::new("Ana B", "ANA@example.com", "secret9", 40, AgeRating::Adult);
        assert!(dir.register(dup).unwrap_err().is_validation());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_authenticate() {
        let dir = UserDirectory::default();
        dir.register(ana()).unwrap();

        let missing = dir.authenticate("bob@example.com", "secret1").unwrap_err();
        assert!(matches!(missing, CatalogError::NotFound { entity: "User", .. }));

        let wrong = dir.authenticate("ana@example.com", "nope").unwrap_err();
        assert_eq!(wrong, CatalogError::Authentication);

        let user = dir.authenticate(" Ana@Example.com ", "secret1").unwrap();
        assert!(user.last_login.is_some());
        assert!(dir.get(user.id).unwrap().last_login.is_some());
    }

    #[test]
    fn test_set_plan_and_admin() {
        let dir = UserDirectory::default();
        let admin = dir
            .add_admin(NewUser::new("Root", "root@example.com", "rootpass", 40, AgeRating::Adult))
            .unwrap();
        assert!(admin.is_admin);

        let user = dir.register(ana()).unwrap();
        let updated = dir.set_plan(user.id, Plan::Premium).unwrap();
        assert_eq!(updated.plan, Plan::Premium);
        assert_eq!(dir.find_by_email("ana@example.com").unwrap().plan, Plan::Premium);

        assert!(dir.set_plan(UserId(99), Plan::Free).is_err());
    }
}
