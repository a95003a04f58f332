//! `ProfileStore` trait: the remote records read and written by the
//! profile step.
//!
//! Two records are involved: `users` keyed by `id` and
//! `consultant_profiles` keyed by `user_id`. Updates are whole-field
//! replacements scoped by id and report how many rows they touched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DatabaseError;

/// A row of the `users` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn new(email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            first_name: None,
            last_name: None,
            profile_photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn with_photo(mut self, url: &str) -> Self {
        self.profile_photo_url = Some(url.to_string());
        self
    }
}

/// A row of the `consultant_profiles` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantProfile {
    pub user_id: Uuid,
    pub job_title: Option<String>,
    pub bio: Option<String>,
    pub address1: Option<String>,
    pub country: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultantProfile {
    /// An empty profile row for `user_id`.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            job_title: None,
            bio: None,
            address1: None,
            country: None,
            updated_at: Utc::now(),
        }
    }
}

/// Fields written to `users` on save.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub profile_photo_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written to `consultant_profiles` on save.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub job_title: String,
    pub bio: Option<String>,
    pub address1: String,
    pub country: String,
    pub updated_at: DateTime<Utc>,
}

/// Backend-agnostic store for the user and consultant profile records.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Users ───────────────────────────────────────────────────────

    /// Insert a new user row.
    async fn insert_user(&self, user: &UserRecord) -> Result<(), DatabaseError>;

    /// Get a user by id.
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError>;

    /// Overwrite the name and photo fields of a user.
    /// Returns the number of rows touched (0 when the user does not exist).
    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<u64, DatabaseError>;

    // ── Consultant profiles ─────────────────────────────────────────

    /// Insert a new consultant profile row.
    async fn insert_consultant_profile(
        &self,
        profile: &ConsultantProfile,
    ) -> Result<(), DatabaseError>;

    /// Get the consultant profile for a user, if one exists.
    async fn get_consultant_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ConsultantProfile>, DatabaseError>;

    /// Overwrite the profile fields for a user.
    /// Returns the number of rows touched (0 when no profile row exists).
    async fn update_consultant_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<u64, DatabaseError>;
}
