//! Wizard steps and the navigation service that moves between them.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// The steps of the onboarding wizard.
///
/// Progresses linearly: Step1 → Step2 → ... → Step6. The profile screen
/// is `Step2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Step1,
    Step2,
    Step3,
    Step4,
    Step5,
    Step6,
}

impl OnboardingStep {
    /// The step this crate implements.
    pub const PROFILE: OnboardingStep = OnboardingStep::Step2;

    pub const ALL: [OnboardingStep; 6] = [
        Self::Step1,
        Self::Step2,
        Self::Step3,
        Self::Step4,
        Self::Step5,
        Self::Step6,
    ];

    /// 1-based position in the wizard.
    pub fn number(&self) -> u8 {
        match self {
            Self::Step1 => 1,
            Self::Step2 => 2,
            Self::Step3 => 3,
            Self::Step4 => 4,
            Self::Step5 => 5,
            Self::Step6 => 6,
        }
    }

    /// Get the next step in the linear progression, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        Self::ALL.get(self.number() as usize).copied()
    }

    /// Get the previous step, if any.
    pub fn previous(&self) -> Option<OnboardingStep> {
        (self.number() as usize)
            .checked_sub(2)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Route id, e.g. `step3`.
    pub fn route_id(&self) -> String {
        format!("step{}", self.number())
    }

    /// Client-side route path, e.g. `/onboarding/step3`.
    pub fn path(&self) -> String {
        format!("/onboarding/{}", self.route_id())
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step{}", self.number())
    }
}

/// Client-side route transition to a sibling onboarding step.
pub trait Navigator: Send + Sync {
    fn go_to(&self, step: OnboardingStep);
}

/// Navigator that records the requested destination instead of moving.
///
/// Used by the HTTP surface, where the client performs the transition
/// after reading the destination from the response.
#[derive(Debug, Default)]
pub struct CapturedNavigation {
    destination: Mutex<Option<OnboardingStep>>,
}

impl CapturedNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent destination, if any navigation happened.
    pub fn destination(&self) -> Option<OnboardingStep> {
        *self
            .destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for CapturedNavigation {
    fn go_to(&self, step: OnboardingStep) {
        *self
            .destination
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(step);
    }
}
