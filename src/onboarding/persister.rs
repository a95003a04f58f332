//! Persister: write a draft back to the user and consultant profile records.
//!
//! The two updates run in sequence and are not transactional. A failed
//! user update skips the profile update; a failed profile update leaves the
//! user update in place. Nothing is retried or rolled back.

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::{DatabaseError, ErrorDetail};
use crate::store::ProfileStore;

use super::identity::Identity;
use super::model::ProfileDraft;

/// What a save attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No identity; nothing was written.
    NoIdentity,
    /// The user update failed; the profile update was not attempted.
    UserUpdateFailed(ErrorDetail),
    /// The user update succeeded but the profile update failed.
    ProfileUpdateFailed(ErrorDetail),
    /// Both updates were issued without error.
    Saved {
        users_touched: u64,
        profiles_touched: u64,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Write `draft` for `identity`. Failures are logged and reported in the
/// outcome, never raised.
pub async fn save_draft(
    identity: Option<&Identity>,
    draft: &ProfileDraft,
    store: &dyn ProfileStore,
) -> SaveOutcome {
    let Some(identity) = identity else {
        error!("No user found, profile not saved");
        return SaveOutcome::NoIdentity;
    };

    let users_touched = match store
        .update_user(identity.id, &draft.to_user_update(Utc::now()))
        .await
    {
        Ok(count) => count,
        Err(e) => {
            let detail = log_write_failure("Error updating user", identity, &e);
            return SaveOutcome::UserUpdateFailed(detail);
        }
    };

    let profiles_touched = match store
        .update_consultant_profile(identity.id, &draft.to_profile_update(Utc::now()))
        .await
    {
        Ok(count) => count,
        Err(e) => {
            let detail = log_write_failure("Error updating consultant profile", identity, &e);
            return SaveOutcome::ProfileUpdateFailed(detail);
        }
    };

    if profiles_touched == 0 {
        warn!(user_id = %identity.id, "No consultant profile row to update");
    }
    info!(
        user_id = %identity.id,
        users_touched,
        profiles_touched,
        "Profile data saved successfully"
    );
    SaveOutcome::Saved {
        users_touched,
        profiles_touched,
    }
}

fn log_write_failure(what: &str, identity: &Identity, e: &DatabaseError) -> ErrorDetail {
    let detail = e.detail();
    error!(
        user_id = %identity.id,
        message = %detail.message,
        code = ?detail.code,
        detail = ?detail.detail,
        hint = ?detail.hint,
        "{what}"
    );
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ConsultantProfile, LibSqlBackend, UserRecord};

    fn draft() -> ProfileDraft {
        ProfileDraft {
            first_name: "Ada".into(),
            last_name: "King".into(),
            headline: "Countess".into(),
            bio: String::new(),
            city: "London".into(),
            country: "United Kingdom".into(),
            profile_picture: Some("data:image/png;base64,AAAA".into()),
        }
    }

    #[tokio::test]
    async fn no_identity_writes_nothing() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let outcome = save_draft(None, &draft(), &db).await;
        assert_eq!(outcome, SaveOutcome::NoIdentity);
        assert!(!outcome.is_saved());
    }

    #[tokio::test]
    async fn saves_both_records() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = UserRecord::new("ada@example.com").with_name("Ada", "Lovelace");
        db.insert_user(&user).await.unwrap();
        db.insert_consultant_profile(&ConsultantProfile::empty(user.id))
            .await
            .unwrap();

        let identity = Identity::from(user.clone());
        let outcome = save_draft(Some(&identity), &draft(), &db).await;
        assert_eq!(
            outcome,
            SaveOutcome::Saved {
                users_touched: 1,
                profiles_touched: 1
            }
        );

        let stored_user = db.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored_user.last_name.as_deref(), Some("King"));
        assert_eq!(
            stored_user.profile_photo_url.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        let stored_profile = db.get_consultant_profile(user.id).await.unwrap().unwrap();
        assert_eq!(stored_profile.job_title.as_deref(), Some("Countess"));
        assert!(stored_profile.bio.is_none());
        assert_eq!(stored_profile.country.as_deref(), Some("United Kingdom"));
    }

    #[tokio::test]
    async fn missing_profile_row_is_not_an_error() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = UserRecord::new("noprofile@example.com");
        db.insert_user(&user).await.unwrap();

        let outcome = save_draft(Some(&Identity::from(user)), &draft(), &db).await;
        assert_eq!(
            outcome,
            SaveOutcome::Saved {
                users_touched: 1,
                profiles_touched: 0
            }
        );
    }
}
