//! libSQL backend: async `ProfileStore` implementation.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{
    ConsultantProfile, ProfileStore, ProfileUpdate, UserRecord, UserUpdate,
};

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

/// Classify a libsql error, keeping constraint violations distinct.
fn query_error(op: &str, e: libsql::Error) -> DatabaseError {
    let message = e.to_string();
    if message.contains("constraint failed") {
        DatabaseError::Constraint(format!("{op}: {message}"))
    } else {
        DatabaseError::Query(format!("{op}: {message}"))
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::Serialization(format!("bad uuid {s}: {e}")))
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, profile_photo_url, created_at, updated_at";

/// Map a libsql Row to a UserRecord (column order matches USER_COLUMNS).
fn row_to_user(row: &libsql::Row) -> Result<UserRecord, DatabaseError> {
    let id: String = row.get(0).map_err(|e| query_error("row_to_user", e))?;
    let email: String = row.get(1).map_err(|e| query_error("row_to_user", e))?;
    let created: String = row.get(5).map_err(|e| query_error("row_to_user", e))?;
    let updated: String = row.get(6).map_err(|e| query_error("row_to_user", e))?;

    Ok(UserRecord {
        id: parse_uuid(&id)?,
        email,
        first_name: row.get(2).ok(),
        last_name: row.get(3).ok(),
        profile_photo_url: row.get(4).ok(),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

const PROFILE_COLUMNS: &str = "user_id, job_title, bio, address1, country, updated_at";

/// Map a libsql Row to a ConsultantProfile (column order matches PROFILE_COLUMNS).
fn row_to_profile(row: &libsql::Row) -> Result<ConsultantProfile, DatabaseError> {
    let user_id: String = row.get(0).map_err(|e| query_error("row_to_profile", e))?;
    let updated: String = row.get(5).map_err(|e| query_error("row_to_profile", e))?;

    Ok(ConsultantProfile {
        user_id: parse_uuid(&user_id)?,
        job_title: row.get(1).ok(),
        bio: row.get(2).ok(),
        address1: row.get(3).ok(),
        country: row.get(4).ok(),
        updated_at: parse_datetime(&updated),
    })
}

#[async_trait]
impl ProfileStore for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Users ───────────────────────────────────────────────────────

    async fn insert_user(&self, user: &UserRecord) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                &format!("INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    user.id.to_string(),
                    user.email.as_str(),
                    opt_text(user.first_name.as_deref()),
                    opt_text(user.last_name.as_deref()),
                    opt_text(user.profile_photo_url.as_deref()),
                    user.created_at.to_rfc3339(),
                    user.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| query_error("insert_user", e))?;
        debug!(user_id = %user.id, "User inserted");
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| query_error("get_user", e))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_user(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(query_error("get_user", e)),
        }
    }

    async fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<u64, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE users SET first_name = ?1, last_name = ?2, profile_photo_url = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    update.first_name.as_str(),
                    update.last_name.as_str(),
                    opt_text(update.profile_photo_url.as_deref()),
                    update.updated_at.to_rfc3339(),
                    id.to_string(),
                ],
            )
            .await
            .map_err(|e| query_error("update_user", e))?;
        Ok(count)
    }

    // ── Consultant profiles ─────────────────────────────────────────

    async fn insert_consultant_profile(
        &self,
        profile: &ConsultantProfile,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                &format!("INSERT INTO consultant_profiles ({PROFILE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    profile.user_id.to_string(),
                    opt_text(profile.job_title.as_deref()),
                    opt_text(profile.bio.as_deref()),
                    opt_text(profile.address1.as_deref()),
                    opt_text(profile.country.as_deref()),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| query_error("insert_consultant_profile", e))?;
        debug!(user_id = %profile.user_id, "Consultant profile inserted");
        Ok(())
    }

    async fn get_consultant_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ConsultantProfile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM consultant_profiles WHERE user_id = ?1"),
                params![user_id.to_string()],
            )
            .await
            .map_err(|e| query_error("get_consultant_profile", e))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(query_error("get_consultant_profile", e)),
        }
    }

    async fn update_consultant_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<u64, DatabaseError> {
        let count = self
            .conn()
            .execute(
                "UPDATE consultant_profiles SET job_title = ?1, bio = ?2, address1 = ?3, country = ?4, updated_at = ?5
                 WHERE user_id = ?6",
                params![
                    update.job_title.as_str(),
                    opt_text(update.bio.as_deref()),
                    update.address1.as_str(),
                    update.country.as_str(),
                    update.updated_at.to_rfc3339(),
                    user_id.to_string(),
                ],
            )
            .await
            .map_err(|e| query_error("update_consultant_profile", e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> LibSqlBackend {
        LibSqlBackend::new_memory().await.unwrap()
    }

    fn user_update(first: &str, last: &str, photo: Option<&str>) -> UserUpdate {
        UserUpdate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            profile_photo_url: photo.map(String::from),
            updated_at: Utc::now(),
        }
    }

    fn profile_update(bio: Option<&str>) -> ProfileUpdate {
        ProfileUpdate {
            job_title: "Fractional CFO".to_string(),
            bio: bio.map(String::from),
            address1: "Lisbon".to_string(),
            country: "Portugal".to_string(),
            updated_at: Utc::now(),
        }
    }

    // ── User tests ──────────────────────────────────────────────────

    #[tokio::test]
    async fn user_insert_and_get() {
        let db = test_db().await;
        let user = UserRecord::new("ada@example.com")
            .with_name("Ada", "Lovelace")
            .with_photo("https://cdn.example.com/ada.png");
        db.insert_user(&user).await.unwrap();

        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.email, "ada@example.com");
        assert_eq!(fetched.first_name.as_deref(), Some("Ada"));
        assert_eq!(fetched.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(
            fetched.profile_photo_url.as_deref(),
            Some("https://cdn.example.com/ada.png")
        );
    }

    #[tokio::test]
    async fn user_get_nonexistent() {
        let db = test_db().await;
        assert!(db.get_user(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn user_null_columns_read_as_none() {
        let db = test_db().await;
        let user = UserRecord::new("blank@example.com");
        db.insert_user(&user).await.unwrap();

        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert!(fetched.first_name.is_none());
        assert!(fetched.last_name.is_none());
        assert!(fetched.profile_photo_url.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_a_constraint_error() {
        let db = test_db().await;
        db.insert_user(&UserRecord::new("dup@example.com"))
            .await
            .unwrap();
        let err = db
            .insert_user(&UserRecord::new("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn user_update_overwrites_fields() {
        let db = test_db().await;
        let user = UserRecord::new("grace@example.com")
            .with_name("Grace", "H")
            .with_photo("https://cdn.example.com/old.png");
        db.insert_user(&user).await.unwrap();

        let count = db
            .update_user(user.id, &user_update("Grace", "Hopper", None))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.last_name.as_deref(), Some("Hopper"));
        // Photo is written wholesale: None clears it
        assert!(fetched.profile_photo_url.is_none());
        assert!(fetched.updated_at >= user.updated_at);
    }

    #[tokio::test]
    async fn user_update_missing_row_touches_nothing() {
        let db = test_db().await;
        let count = db
            .update_user(Uuid::new_v4(), &user_update("No", "One", None))
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    // ── Consultant profile tests ────────────────────────────────────

    #[tokio::test]
    async fn profile_insert_get_update() {
        let db = test_db().await;
        let user = UserRecord::new("linus@example.com");
        db.insert_user(&user).await.unwrap();
        db.insert_consultant_profile(&ConsultantProfile::empty(user.id))
            .await
            .unwrap();

        let empty = db.get_consultant_profile(user.id).await.unwrap().unwrap();
        assert!(empty.job_title.is_none());
        assert!(empty.country.is_none());

        let count = db
            .update_consultant_profile(user.id, &profile_update(Some("Twenty years in finance.")))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let fetched = db.get_consultant_profile(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.job_title.as_deref(), Some("Fractional CFO"));
        assert_eq!(fetched.bio.as_deref(), Some("Twenty years in finance."));
        assert_eq!(fetched.address1.as_deref(), Some("Lisbon"));
        assert_eq!(fetched.country.as_deref(), Some("Portugal"));
    }

    #[tokio::test]
    async fn profile_update_null_bio() {
        let db = test_db().await;
        let user = UserRecord::new("nobio@example.com");
        db.insert_user(&user).await.unwrap();
        let mut profile = ConsultantProfile::empty(user.id);
        profile.bio = Some("old bio".to_string());
        db.insert_consultant_profile(&profile).await.unwrap();

        db.update_consultant_profile(user.id, &profile_update(None))
            .await
            .unwrap();
        let fetched = db.get_consultant_profile(user.id).await.unwrap().unwrap();
        assert!(fetched.bio.is_none());
    }

    #[tokio::test]
    async fn profile_update_missing_row_touches_nothing() {
        let db = test_db().await;
        let count = db
            .update_consultant_profile(Uuid::new_v4(), &profile_update(None))
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(
            db.get_consultant_profile(Uuid::new_v4())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn local_db_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("onboarding.db");
        let user = UserRecord::new("disk@example.com").with_name("Disk", "User");
        {
            let db = LibSqlBackend::new_local(&path).await.unwrap();
            db.insert_user(&user).await.unwrap();
        }
        assert!(path.exists());

        let db = LibSqlBackend::new_local(&path).await.unwrap();
        let fetched = db.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.first_name.as_deref(), Some("Disk"));
    }

    #[test]
    fn parse_datetime_formats() {
        let rfc = parse_datetime("2026-01-02T03:04:05+00:00");
        assert_eq!(rfc.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        let sqlite = parse_datetime("2026-01-02 03:04:05");
        assert_eq!(sqlite, rfc);
        assert_eq!(parse_datetime("garbage"), DateTime::<Utc>::MIN_UTC);
    }
}
