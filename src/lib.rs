//! Onboarding profile step: load, edit, save and advance.

pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
