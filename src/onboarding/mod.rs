//! Onboarding profile step: the second screen of the onboarding wizard.
//!
//! The step pre-fills a profile draft from the signed-in user's records,
//! lets the user edit it (including an inline photo preview), and writes it
//! back before moving to a sibling step.

pub mod countries;
pub mod identity;
pub mod loader;
pub mod manager;
pub mod model;
pub mod persister;
pub mod photo;
pub mod routes;
pub mod state;
pub mod view;

pub use identity::{Identity, IdentityProvider, SessionIdentity};
pub use manager::ProfileStep;
pub use model::{Field, ProfileDraft};
pub use persister::SaveOutcome;
pub use photo::SelectedFile;
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{CapturedNavigation, Navigator, OnboardingStep};
pub use view::StepView;
