//! REST endpoints for the profile step.
//!
//! Each request builds a fresh `ProfileStep` for the session user named in
//! the `x-user-id` header and drives it through one handler.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;
use uuid::Uuid;

use crate::config::StepConfig;
use crate::error::EditError;
use crate::store::ProfileStore;

use super::countries::COUNTRIES;
use super::identity::SessionIdentity;
use super::manager::ProfileStep;
use super::model::ProfileDraft;
use super::photo::{SelectedFile, encode_preview};
use super::state::{CapturedNavigation, Navigator};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub store: Arc<dyn ProfileStore>,
    pub config: StepConfig,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    // A draft may carry an inline photo, which base64 inflates by a third.
    let body_limit = state
        .config
        .max_photo_bytes
        .saturating_mul(2)
        .saturating_add(64 * 1024);

    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/countries", get(list_countries))
        .route("/api/onboarding/profile", get(get_profile))
        .route("/api/onboarding/profile/photo", post(select_photo))
        .route("/api/onboarding/profile/continue", post(continue_step))
        .route("/api/onboarding/profile/skip", post(skip_step))
        .route("/api/onboarding/profile/back", post(back_step))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Session user from the request headers. A malformed id counts as no
/// session.
fn session_user(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(value = %raw, error = %e, "Ignoring malformed user id header");
            None
        }
    }
}

fn step_for(
    state: &OnboardingRouteState,
    headers: &HeaderMap,
) -> (ProfileStep, Arc<CapturedNavigation>) {
    let identity = SessionIdentity::new(Arc::clone(&state.store), session_user(headers));
    let navigation = Arc::new(CapturedNavigation::new());
    let step = ProfileStep::new(
        Arc::clone(&state.store),
        Arc::new(identity),
        Arc::clone(&navigation) as Arc<dyn Navigator>,
        state.config.clone(),
    );
    (step, navigation)
}

fn edit_rejected(e: &EditError) -> Response {
    let status = match e {
        EditError::NotAnImage { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        EditError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        EditError::UnknownCountry(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, Json(serde_json::json!({"error": e.to_string()}))).into_response()
}

fn next_response(navigation: &CapturedNavigation) -> Response {
    match navigation.destination() {
        Some(step) => (
            StatusCode::OK,
            Json(serde_json::json!({"next": step.path()})),
        )
            .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "No step to navigate to"})),
        )
            .into_response(),
    }
}

// ── Endpoints ───────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

async fn list_countries() -> impl IntoResponse {
    Json(&COUNTRIES[..])
}

/// GET /api/onboarding/profile
///
/// Loads the step for the session user and returns the rendered view.
async fn get_profile(State(state): State<OnboardingRouteState>, headers: HeaderMap) -> Response {
    let (mut step, _) = step_for(&state, &headers);
    step.mount().await;
    Json(step.view()).into_response()
}

/// POST /api/onboarding/profile/photo
///
/// Raw image body. Returns the inline preview reference; nothing is stored.
async fn select_photo(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let file_name = headers
        .get(FILE_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("upload");

    let file = SelectedFile::new(file_name, mime_type, body.to_vec());
    match encode_preview(&file, state.config.max_photo_bytes) {
        Ok(data_url) => Json(serde_json::json!({"profile_picture": data_url})).into_response(),
        Err(e) => {
            warn!(file_name = %file_name, error = %e, "Photo rejected");
            edit_rejected(&e)
        }
    }
}

/// POST /api/onboarding/profile/continue
///
/// Loads the stored record, applies the submitted draft over it, then
/// saves and advances only when every required field is filled.
async fn continue_step(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    Json(draft): Json<ProfileDraft>,
) -> Response {
    let (mut step, navigation) = step_for(&state, &headers);
    step.mount().await;
    if let Err(e) = step.replace_draft(draft) {
        return edit_rejected(&e);
    }
    if !step.is_valid() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Required fields are missing",
                "missing_fields": step.draft().missing_fields(),
            })),
        )
            .into_response();
    }
    step.continue_step().await;
    next_response(&navigation)
}

/// POST /api/onboarding/profile/skip
///
/// Loads the stored record, applies the submitted draft over it, then
/// saves whatever is there and advances.
async fn skip_step(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    Json(draft): Json<ProfileDraft>,
) -> Response {
    let (mut step, navigation) = step_for(&state, &headers);
    step.mount().await;
    if let Err(e) = step.replace_draft(draft) {
        return edit_rejected(&e);
    }
    step.skip().await;
    next_response(&navigation)
}

/// POST /api/onboarding/profile/back
async fn back_step(State(state): State<OnboardingRouteState>, headers: HeaderMap) -> Response {
    let (mut step, navigation) = step_for(&state, &headers);
    step.back();
    next_response(&navigation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_user_parses_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, id.to_string().parse().unwrap());
        assert_eq!(session_user(&headers), Some(id));
    }

    #[test]
    fn malformed_session_user_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_user(&headers), None);

        headers.insert(USER_ID_HEADER, "not-a-uuid".parse().unwrap());
        assert_eq!(session_user(&headers), None);
    }

    #[test]
    fn edit_errors_map_to_statuses() {
        let not_image = EditError::NotAnImage {
            file_name: "a.pdf".into(),
            mime_type: "application/pdf".into(),
        };
        assert_eq!(
            edit_rejected(&not_image).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );

        let too_large = EditError::FileTooLarge {
            file_name: "a.png".into(),
            size: 10,
            max: 5,
        };
        assert_eq!(edit_rejected(&too_large).status(), StatusCode::PAYLOAD_TOO_LARGE);

        let country = EditError::UnknownCountry("Atlantis".into());
        assert_eq!(
            edit_rejected(&country).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
