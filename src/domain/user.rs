//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classification::AgeRating;
use super::error::CatalogError;

/// Sequential user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "premium" => Ok(Plan::Premium),
            _ => Err(CatalogError::validation(format!("unknown plan: {}", s))),
        }
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,

    pub name: String,

    /// Login key, stored as entered
    pub email: String,

    /// Plaintext; compared by equality at login
    #[serde(skip)]
    pub password: String,

    pub age: u32,

    /// Classification the user declared at registration
    pub age_rating: AgeRating,

    pub plan: Plan,

    pub is_admin: bool,

    pub created_at: DateTime<Utc>,

    pub last_login: Option<DateTime<Utc>>,
}

/// Registration request
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    pub age_rating: AgeRating,
    /// Falls back to the configured default plan
    pub plan: Option<Plan>,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        age: u32,
        age_rating: AgeRating,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            age,
            age_rating,
            plan: None,
        }
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = Some(plan);
        self
    }
}
