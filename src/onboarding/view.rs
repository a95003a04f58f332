//! Render model for the profile step.
//!
//! Everything a client needs to draw the screen, recomputed from the draft
//! on every call. Building a view never mutates state.

use serde::Serialize;

use super::countries::COUNTRIES;
use super::model::{Field, ProfileDraft};
use super::state::OnboardingStep;

pub const TITLE: &str = "Your Profile";
pub const LOADING_TEXT: &str = "Loading profile...";
pub const PHOTO_LABEL: &str = "Add a profile picture*";
pub const REQUIRED_NOTE: &str = "All fields marked with * are required before proceeding";
pub const SKIP_LABEL: &str = "I'll do this later";

/// Position of a step relative to the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Progress {
    Completed,
    Current,
    Upcoming,
}

/// One dot of the stepped progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepMarker {
    pub number: u8,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub id: Field,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    pub value: String,
}

/// The whole screen.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub loading: bool,
    pub title: &'static str,
    pub progress: Vec<StepMarker>,
    pub photo_label: &'static str,
    pub profile_picture: Option<String>,
    pub fields: Vec<FieldView>,
    /// Live bio count, e.g. `"12/2000"`.
    pub bio_counter: String,
    pub countries: &'static [&'static str],
    pub required_note: &'static str,
    pub missing_fields: Vec<Field>,
    pub continue_enabled: bool,
    pub skip_label: &'static str,
}

impl StepView {
    /// Blocking placeholder shown until the load settles.
    pub fn loading(bio_max_chars: usize) -> Self {
        Self::build(&ProfileDraft::default(), true, bio_max_chars)
    }

    pub fn build(draft: &ProfileDraft, loading: bool, bio_max_chars: usize) -> Self {
        let missing_fields = draft.missing_fields();
        Self {
            loading,
            title: if loading { LOADING_TEXT } else { TITLE },
            progress: progress_markers(OnboardingStep::PROFILE),
            photo_label: PHOTO_LABEL,
            profile_picture: draft.profile_picture.clone(),
            fields: Field::ALL
                .into_iter()
                .map(|field| FieldView {
                    id: field,
                    label: field.label(),
                    placeholder: field.placeholder(),
                    required: field.is_required(),
                    value: draft.get(field).to_string(),
                })
                .collect(),
            bio_counter: format!("{}/{}", draft.bio_len(), bio_max_chars),
            countries: &COUNTRIES,
            required_note: REQUIRED_NOTE,
            continue_enabled: !loading && missing_fields.is_empty(),
            missing_fields,
            skip_label: SKIP_LABEL,
        }
    }
}

/// Markers for every wizard step with `current` highlighted.
pub fn progress_markers(current: OnboardingStep) -> Vec<StepMarker> {
    OnboardingStep::ALL
        .into_iter()
        .map(|step| StepMarker {
            number: step.number(),
            progress: match step.cmp(&current) {
                std::cmp::Ordering::Less => Progress::Completed,
                std::cmp::Ordering::Equal => Progress::Current,
                std::cmp::Ordering::Greater => Progress::Upcoming,
            },
        })
        .collect()
}
