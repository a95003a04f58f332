//! Profile draft: the locally held, not yet committed form state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::store::{ProfileUpdate, UserUpdate};

use super::countries::is_known_country;

/// An editable text field of the profile step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FirstName,
    LastName,
    Headline,
    Bio,
    City,
    Country,
}

impl Field {
    /// All text fields, in form order.
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Headline,
        Field::Bio,
        Field::City,
        Field::Country,
    ];

    /// Whether the field must be non-blank before continuing.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Bio)
    }

    /// Form label, with `*` marking required fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstName => "First name*",
            Self::LastName => "Last name*",
            Self::Headline => "Headline*",
            Self::Bio => "Bio (Optional)",
            Self::City => "City*",
            Self::Country => "Country*",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::FirstName => "Enter your first name",
            Self::LastName => "Enter your last name",
            Self::Headline => "How could you add value to potential clients?",
            Self::Bio => "Write a short bio about yourself here...",
            Self::City => "Enter your city",
            Self::Country => "Select your country",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Headline => "headline",
            Self::Bio => "bio",
            Self::City => "city",
            Self::Country => "country",
        };
        write!(f, "{s}")
    }
}

/// In-memory profile form state, owned by one screen for its lifetime.
///
/// `profile_picture` starts as the stored remote URL and is replaced by a
/// `data:` URL when the user picks a new file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDraft {
    pub first_name: String,
    pub last_name: String,
    pub headline: String,
    pub bio: String,
    pub city: String,
    pub country: String,
    pub profile_picture: Option<String>,
}

impl ProfileDraft {
    /// Current value of a text field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Headline => &self.headline,
            Field::Bio => &self.bio,
            Field::City => &self.city,
            Field::Country => &self.country,
        }
    }

    /// Return a copy of the draft with `field` replaced by `value`.
    ///
    /// Bio is truncated to `bio_max_chars`. Country must be empty or one of
    /// the fixed list; anything else is rejected and the draft is untouched.
    pub fn merged(
        &self,
        field: Field,
        value: &str,
        bio_max_chars: usize,
    ) -> Result<ProfileDraft, EditError> {
        let mut next = self.clone();
        match field {
            Field::FirstName => next.first_name = value.to_string(),
            Field::LastName => next.last_name = value.to_string(),
            Field::Headline => next.headline = value.to_string(),
            Field::Bio => next.bio = truncate_chars(value, bio_max_chars),
            Field::City => next.city = value.to_string(),
            Field::Country => {
                if !value.is_empty() && !is_known_country(value) {
                    return Err(EditError::UnknownCountry(value.to_string()));
                }
                next.country = value.to_string();
            }
        }
        Ok(next)
    }

    /// Required fields that are blank after trimming, in form order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| f.is_required() && self.get(*f).trim().is_empty())
            .collect()
    }

    /// Complete iff every required field is non-blank. Bio and photo never
    /// affect validity.
    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Bio length in characters.
    pub fn bio_len(&self) -> usize {
        self.bio.chars().count()
    }

    /// Fields written to the `users` record.
    pub fn to_user_update(&self, now: DateTime<Utc>) -> UserUpdate {
        UserUpdate {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            profile_photo_url: self.profile_picture.clone(),
            updated_at: now,
        }
    }

    /// Fields written to the `consultant_profiles` record. An empty bio is
    /// stored as null.
    pub fn to_profile_update(&self, now: DateTime<Utc>) -> ProfileUpdate {
        ProfileUpdate {
            job_title: self.headline.clone(),
            bio: (!self.bio.is_empty()).then(|| self.bio.clone()),
            address1: self.city.clone(),
            country: self.country.clone(),
            updated_at: now,
        }
    }
}

/// Keep at most `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
