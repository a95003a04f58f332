//! Loader: pre-fill a draft from the identity and its profile record.

use tracing::{debug, error, info};

use crate::store::ProfileStore;

use super::identity::Identity;
use super::model::ProfileDraft;

/// Build the initial draft for `identity`.
///
/// Name fields come from the identity. Headline, bio, city and country come
/// from the consultant profile record when one exists, as stored: the bio
/// cap applies to edits, not to what is already saved. The stored photo
/// reference is applied last. A failed profile read is logged and leaves
/// the profile fields empty; it never fails the load.
pub async fn load_draft(
    identity: Option<&Identity>,
    store: &dyn ProfileStore,
) -> ProfileDraft {
    let Some(identity) = identity else {
        debug!("No identity, nothing to load");
        return ProfileDraft::default();
    };

    let mut draft = ProfileDraft {
        first_name: identity.first_name.clone(),
        last_name: identity.last_name.clone(),
        ..Default::default()
    };

    match store.get_consultant_profile(identity.id).await {
        Ok(Some(profile)) => {
            draft.headline = profile.job_title.unwrap_or_default();
            draft.bio = profile.bio.unwrap_or_default();
            draft.city = profile.address1.unwrap_or_default();
            draft.country = profile.country.unwrap_or_default();
            info!(user_id = %identity.id, "Loaded existing profile data");
        }
        Ok(None) => {
            info!(user_id = %identity.id, "No existing profile data found");
        }
        Err(e) => {
            let detail = e.detail();
            error!(
                user_id = %identity.id,
                message = %detail.message,
                code = ?detail.code,
                detail = ?detail.detail,
                hint = ?detail.hint,
                "Error loading profile data"
            );
        }
    }

    if let Some(url) = &identity.profile_photo_url {
        draft.profile_picture = Some(url.clone());
        debug!(user_id = %identity.id, url = %url, "Loaded existing profile picture");
    }

    draft
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::error::DatabaseError;
    use crate::store::{ConsultantProfile, LibSqlBackend, ProfileUpdate, UserRecord, UserUpdate};

    /// Store whose profile reads fail with a fully described remote error.
    struct FailingReads;

    #[async_trait]
    impl ProfileStore for FailingReads {
        async fn run_migrations(&self) -> Result<(), DatabaseError> {
            Ok(())
        }
        async fn insert_user(&self, _user: &UserRecord) -> Result<(), DatabaseError> {
            Ok(())
        }
        async fn get_user(&self, _id: Uuid) -> Result<Option<UserRecord>, DatabaseError> {
            Ok(None)
        }
        async fn update_user(&self, _id: Uuid, _update: &UserUpdate) -> Result<u64, DatabaseError> {
            Ok(0)
        }
        async fn insert_consultant_profile(
            &self,
            _profile: &ConsultantProfile,
        ) -> Result<(), DatabaseError> {
            Ok(())
        }
        async fn get_consultant_profile(
            &self,
            _user_id: Uuid,
        ) -> Result<Option<ConsultantProfile>, DatabaseError> {
            Err(DatabaseError::Remote {
                message: "permission denied for table consultant_profiles".into(),
                code: Some("42501".into()),
                detail: Some("policy consultant_read".into()),
                hint: Some("check row level security".into()),
            })
        }
        async fn update_consultant_profile(
            &self,
            _user_id: Uuid,
            _update: &ProfileUpdate,
        ) -> Result<u64, DatabaseError> {
            Ok(0)
        }
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn identity_for(user: &UserRecord) -> Identity {
        Identity::from(user.clone())
    }

    #[tokio::test]
    async fn no_identity_gives_empty_draft() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let draft = load_draft(None, &db).await;
        assert_eq!(draft, ProfileDraft::default());
    }

    #[tokio::test]
    async fn identity_without_profile_fills_names_only() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = UserRecord::new("ada@example.com").with_name("Ada", "Lovelace");
        db.insert_user(&user).await.unwrap();

        let draft = load_draft(Some(&identity_for(&user)), &db).await;
        assert_eq!(draft.first_name, "Ada");
        assert_eq!(draft.last_name, "Lovelace");
        assert!(draft.headline.is_empty());
        assert!(draft.bio.is_empty());
        assert!(draft.city.is_empty());
        assert!(draft.country.is_empty());
        assert!(draft.profile_picture.is_none());
    }

    #[tokio::test]
    async fn identity_with_profile_and_photo_fills_everything() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = UserRecord::new("grace@example.com")
            .with_name("Grace", "Hopper")
            .with_photo("https://cdn.example.com/grace.png");
        db.insert_user(&user).await.unwrap();
        db.insert_consultant_profile(&ConsultantProfile {
            job_title: Some("Compiler whisperer".into()),
            bio: Some("Rear admiral.".into()),
            address1: Some("Arlington".into()),
            country: Some("United States".into()),
            ..ConsultantProfile::empty(user.id)
        })
        .await
        .unwrap();

        let draft = load_draft(Some(&identity_for(&user)), &db).await;
        assert_eq!(draft.headline, "Compiler whisperer");
        assert_eq!(draft.bio, "Rear admiral.");
        assert_eq!(draft.city, "Arlington");
        assert_eq!(draft.country, "United States");
        assert_eq!(
            draft.profile_picture.as_deref(),
            Some("https://cdn.example.com/grace.png")
        );
        assert!(draft.is_valid());
    }

    #[tokio::test]
    async fn oversized_stored_bio_is_loaded_whole() {
        let db = LibSqlBackend::new_memory().await.unwrap();
        let user = UserRecord::new("long@example.com").with_name("Long", "Bio");
        db.insert_user(&user).await.unwrap();
        db.insert_consultant_profile(&ConsultantProfile {
            bio: Some("b".repeat(2500)),
            ..ConsultantProfile::empty(user.id)
        })
        .await
        .unwrap();

        let draft = load_draft(Some(&identity_for(&user)), &db).await;
        assert_eq!(draft.bio_len(), 2500);
    }

    #[tokio::test]
    async fn read_failure_logs_full_detail_and_keeps_names() {
        let logs = CapturedLogs::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let identity = Identity {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            profile_photo_url: Some("https://cdn.example.com/ada.png".into()),
        };
        let draft = load_draft(Some(&identity), &FailingReads).await;
        assert_eq!(draft.first_name, "Ada");
        assert!(draft.headline.is_empty());
        assert!(draft.profile_picture.is_some());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Error loading profile data"), "{output}");
        assert!(output.contains("42501"), "{output}");
        assert!(output.contains("policy consultant_read"), "{output}");
        assert!(output.contains("check row level security"), "{output}");
    }
}
