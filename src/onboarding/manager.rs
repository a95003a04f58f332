//! ProfileStep: the screen controller. Owns the draft, resolves the
//! identity once, and wires load, edit, save and navigation together.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::StepConfig;
use crate::error::EditError;
use crate::store::ProfileStore;

use super::identity::{Identity, IdentityProvider};
use super::loader::load_draft;
use super::model::{Field, ProfileDraft};
use super::persister::{SaveOutcome, save_draft};
use super::photo::{SelectedFile, encode_preview};
use super::state::{Navigator, OnboardingStep};
use super::view::StepView;

/// Controller for the profile step of the onboarding wizard.
///
/// Driven through `&mut self` handlers from a single event loop, so it
/// holds no locks. Every async handler is bound to the screen's lifetime:
/// after `unmount()` a pending load is dropped without touching the draft
/// and no further navigation is issued.
pub struct ProfileStep {
    store: Arc<dyn ProfileStore>,
    identity_provider: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    config: StepConfig,
    /// `None` until the identity has been asked for.
    identity: Option<Option<Identity>>,
    draft: ProfileDraft,
    loading: bool,
    loaded: bool,
    lifetime: CancellationToken,
}

impl ProfileStep {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        navigator: Arc<dyn Navigator>,
        config: StepConfig,
    ) -> Self {
        Self {
            store,
            identity_provider,
            navigator,
            config,
            identity: None,
            draft: ProfileDraft::default(),
            loading: true,
            loaded: false,
            lifetime: CancellationToken::new(),
        }
    }

    /// Load the draft from the identity and profile record.
    ///
    /// Runs at most once per screen. Failures are logged and leave an empty
    /// (or partially filled) draft; the screen always becomes interactive.
    pub async fn mount(&mut self) {
        if self.loaded {
            debug!("Profile step already loaded");
            return;
        }
        self.loaded = true;
        self.loading = true;

        let lifetime = self.lifetime.clone();
        let identity = tokio::select! {
            biased;
            _ = lifetime.cancelled() => {
                debug!("Screen unmounted while resolving identity");
                return;
            }
            identity = self.resolve_identity() => identity,
        };

        let store = Arc::clone(&self.store);
        let draft = tokio::select! {
            biased;
            _ = lifetime.cancelled() => {
                debug!("Screen unmounted while loading profile");
                return;
            }
            draft = load_draft(identity.as_ref(), store.as_ref()) => draft,
        };

        self.draft = draft;
        self.loading = false;
        info!(
            user_id = ?identity.as_ref().map(|i| i.id),
            complete = self.draft.is_valid(),
            "Profile step loaded"
        );
    }

    /// Ask the identity provider once and remember the answer for the rest
    /// of the screen's life. A failed lookup counts as no identity.
    async fn resolve_identity(&mut self) -> Option<Identity> {
        if let Some(resolved) = &self.identity {
            return resolved.clone();
        }
        let resolved = match self.identity_provider.current_user().await {
            Ok(identity) => identity,
            Err(e) => {
                error!(error = %e, "Error loading user data");
                None
            }
        };
        self.identity = Some(resolved.clone());
        resolved
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Pure derivation from the current draft.
    pub fn is_valid(&self) -> bool {
        self.draft.is_valid()
    }

    /// Render model for the current state.
    pub fn view(&self) -> StepView {
        if self.loading {
            StepView::loading(self.config.bio_max_chars)
        } else {
            StepView::build(&self.draft, false, self.config.bio_max_chars)
        }
    }

    /// Replace one field. Rejected edits leave the draft unchanged.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), EditError> {
        self.draft = self
            .draft
            .merged(field, value, self.config.bio_max_chars)
            .inspect_err(|e| warn!(%field, error = %e, "Edit rejected"))?;
        Ok(())
    }

    /// Encode a picked image for preview and make it the profile picture.
    pub fn select_photo(&mut self, file: &SelectedFile) -> Result<(), EditError> {
        let data_url = encode_preview(file, self.config.max_photo_bytes)?;
        debug!(
            file_name = %file.file_name,
            size = file.bytes.len(),
            "Profile picture selected"
        );
        self.draft.profile_picture = Some(data_url);
        Ok(())
    }

    /// Take a whole draft submitted by a client. Fields that differ from
    /// the current draft pass through the editor; unchanged fields are kept
    /// as they are, so values loaded from storage survive a round trip. The
    /// screen is treated as loaded afterwards.
    pub fn replace_draft(&mut self, submitted: ProfileDraft) -> Result<(), EditError> {
        let mut draft = self.draft.clone();
        for field in Field::ALL {
            let value = submitted.get(field);
            if value != self.draft.get(field) {
                draft = draft.merged(field, value, self.config.bio_max_chars)?;
            }
        }
        draft.profile_picture = submitted.profile_picture;

        self.draft = draft;
        self.loaded = true;
        self.loading = false;
        Ok(())
    }

    /// Write the draft to both records using the identity resolved for
    /// this screen.
    pub async fn save(&mut self) -> SaveOutcome {
        let identity = self.resolve_identity().await;
        let store = Arc::clone(&self.store);
        save_draft(identity.as_ref(), &self.draft, store.as_ref()).await
    }

    /// Go to the previous step without saving.
    pub fn back(&mut self) -> Option<OnboardingStep> {
        self.navigate(OnboardingStep::PROFILE.previous())
    }

    /// Save and go to the next step, only when the draft is complete.
    ///
    /// Returns `None` without saving when required fields are missing. The
    /// save outcome never blocks navigation.
    pub async fn continue_step(&mut self) -> Option<OnboardingStep> {
        if !self.draft.is_valid() {
            debug!(missing = ?self.draft.missing_fields(), "Continue blocked");
            return None;
        }
        let outcome = self.save().await;
        debug!(?outcome, "Save finished before continue");
        self.navigate(OnboardingStep::PROFILE.next())
    }

    /// Save whatever is there and go to the next step.
    pub async fn skip(&mut self) -> Option<OnboardingStep> {
        let outcome = self.save().await;
        debug!(?outcome, "Save finished before skip");
        self.navigate(OnboardingStep::PROFILE.next())
    }

    /// End the screen's lifetime. Pending loads are abandoned and later
    /// navigation requests are ignored.
    pub fn unmount(&mut self) {
        self.lifetime.cancel();
    }

    /// Token cancelled when the screen unmounts, for tying outside work to
    /// the screen's lifetime.
    pub fn lifetime(&self) -> CancellationToken {
        self.lifetime.clone()
    }

    fn navigate(&self, step: Option<OnboardingStep>) -> Option<OnboardingStep> {
        let step = step?;
        if self.lifetime.is_cancelled() {
            debug!(to = %step, "Screen unmounted, ignoring navigation");
            return None;
        }
        info!(to = %step, path = %step.path(), "Navigating");
        self.navigator.go_to(step);
        Some(step)
    }
}
