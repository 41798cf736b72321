//! HTTP routes.
//!
//! Turn endpoints answer with newline-delimited JSON: one line per snapshot,
//! flushed as each stage completes.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storyteller_domain::{Session, SessionId};

use crate::app::App;
use crate::infrastructure::ports::FaceFrame;
use crate::use_cases::emotion::SampleOutcome;
use crate::use_cases::story::{Degradation, TurnSnapshot, TurnStage, TurnStatus, TurnStream};

const NDJSON: &str = "application/x-ndjson";

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/{id}/start", post(start_story))
        .route("/api/sessions/{id}/choices", post(continue_story))
        .route("/api/sessions/{id}/emotion", post(observe_emotion))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Sessions
// =============================================================================

#[derive(Debug, Serialize)]
struct SessionCreated {
    session_id: SessionId,
}

async fn create_session(State(app): State<Arc<App>>) -> (StatusCode, Json<SessionCreated>) {
    let session = app.sessions.create();
    tracing::info!(session_id = %session.id(), "Created session");
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: session.id(),
        }),
    )
}

async fn get_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, ApiError> {
    let session = app
        .sessions
        .get(SessionId::from_uuid(id))
        .ok_or(ApiError::NotFound)?;
    Ok(Json(session))
}

async fn delete_session(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app.sessions
        .remove(SessionId::from_uuid(id))
        .ok_or(ApiError::NotFound)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Turns
// =============================================================================

#[derive(Debug, Deserialize)]
struct StartRequest {
    #[serde(default)]
    theme: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRequest {
    #[serde(default)]
    choice: String,
}

/// Wire form of one snapshot.
#[derive(Debug, Serialize)]
struct SnapshotView {
    stage: TurnStage,
    story_text: String,
    audio: Option<String>,
    image: Option<String>,
    moral_summary: String,
    status: TurnStatus,
    status_message: String,
    degradations: Vec<Degradation>,
    session: Session,
}

impl From<TurnSnapshot> for SnapshotView {
    fn from(snapshot: TurnSnapshot) -> Self {
        let status_message = snapshot.status_message();
        Self {
            stage: snapshot.stage,
            story_text: snapshot.story_text,
            audio: snapshot.audio.as_deref().map(display_path),
            image: snapshot.image.as_deref().map(display_path),
            moral_summary: snapshot.moral_summary,
            status: snapshot.status,
            status_message,
            degradations: snapshot.degradations,
            session: snapshot.session,
        }
    }
}

fn display_path(path: &FsPath) -> String {
    path.to_string_lossy().into_owned()
}

async fn start_story(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<StartRequest>,
) -> Response {
    let session = app.sessions.get_or_new(SessionId::from_uuid(id));
    let turns = app.use_cases.story.turns.start_turn(
        &request.theme,
        request.language.as_deref(),
        session,
    );
    stream_turn(app, turns)
}

async fn continue_story(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChoiceRequest>,
) -> Response {
    let session = app.sessions.get_or_new(SessionId::from_uuid(id));
    let ambient = session.ambient().label().clone();
    let turns = app
        .use_cases
        .story
        .turns
        .continue_turn(&request.choice, ambient, session);
    stream_turn(app, turns)
}

/// Commit each snapshot's session and write it as one NDJSON line.
///
/// The store skips a commit once a restart has superseded this turn.
fn stream_turn(app: Arc<App>, turns: TurnStream) -> Response {
    let lines = turns.map(move |snapshot| {
        if !snapshot.status.is_rejection() {
            app.sessions.commit(snapshot.session.clone());
        }
        let mut line = serde_json::to_vec(&SnapshotView::from(snapshot))?;
        line.push(b'\n');
        Ok::<_, serde_json::Error>(line)
    });

    ([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(lines)).into_response()
}

// =============================================================================
// Emotion
// =============================================================================

#[derive(Debug, Serialize)]
struct EmotionObserved {
    outcome: SampleOutcome,
    ambient: String,
}

async fn observe_emotion(
    State(app): State<Arc<App>>,
    Path(id): Path<Uuid>,
    Json(frame): Json<FaceFrame>,
) -> Result<Json<EmotionObserved>, ApiError> {
    let feed = app.use_cases.emotion.feed.clone();
    let (outcome, ambient) = app
        .sessions
        .update_ambient(SessionId::from_uuid(id), |ambient| {
            feed.observe(ambient, &frame)
        })
        .ok_or(ApiError::NotFound)?;

    Ok(Json(EmotionObserved {
        outcome,
        ambient: ambient.label().to_string(),
    }))
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found").into_response(),
        }
    }
}
