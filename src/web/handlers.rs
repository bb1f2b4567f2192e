use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::{render, AppState};
use crate::controller::{Action, Availability, Outcome, Tab, ViewState};
use crate::direction::Direction;
use crate::error::BilingualError;
use crate::loader::LoadStatus;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub direction: Option<Direction>,
    pub tab: Option<Tab>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormAction {
    #[default]
    Translate,
    Clear,
    Select,
}

/// The page form: direction radios, the draft text and the pressed button
#[derive(Debug, Deserialize)]
pub struct PageForm {
    pub direction: Direction,
    #[serde(default)]
    pub tab: Tab,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub action: FormAction,
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub direction: Direction,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub request_id: Uuid,
    pub direction: Direction,
    pub original: String,
    pub cleaned: String,
    pub translated: String,
    pub elapsed_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct PipelineStatusBody {
    pub direction: Direction,
    pub model: String,
    pub status: LoadStatus,
}

/// JSON error body with a status code
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Page render for a (possibly new) direction selection
pub async fn page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let direction = query.direction.unwrap_or_default();
    let current = ViewState::new(direction).with_tab(query.tab.unwrap_or_default());

    let view = state
        .controller()
        .handle(&current, Action::SelectDirection(direction))
        .await;

    Html(render::render_page(&view, state.config()))
}

/// Translate, Clear or direction switch posted from the page form
pub async fn page_action(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PageForm>,
) -> Html<String> {
    debug!("Form action {:?} for {}", form.action, form.direction);

    let current = ViewState::new(form.direction)
        .with_tab(form.tab)
        .with_input(form.text.clone());
    let action = match form.action {
        FormAction::Translate => Action::Submit(form.text),
        FormAction::Clear => Action::Clear,
        FormAction::Select => Action::SelectDirection(form.direction),
    };

    let view = state.controller().handle(&current, action).await;
    Html(render::render_page(&view, state.config()))
}

pub async fn api_translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    debug!("API translation {} for {}", request_id, request.direction);

    let view = state
        .controller()
        .handle(&ViewState::new(request.direction), Action::Submit(request.text))
        .await;

    match view.outcome {
        Outcome::Translated(translation) => Ok(Json(TranslateResponse {
            request_id,
            direction: view.direction,
            elapsed_ms: translation.elapsed.as_millis(),
            original: translation.result.original,
            cleaned: translation.result.cleaned,
            translated: translation.result.translated,
        })),
        Outcome::Warning(message) => Err(ApiError::new(StatusCode::BAD_REQUEST, message)),
        Outcome::Failed(message) => Err(ApiError::new(StatusCode::BAD_GATEWAY, message)),
        Outcome::Idle => {
            let message = match view.availability {
                Availability::Unavailable(message) => message,
                Availability::Ready => "Translation was not performed".to_string(),
            };
            Err(ApiError::new(StatusCode::SERVICE_UNAVAILABLE, message))
        }
    }
}

pub async fn api_pipelines(State(state): State<Arc<AppState>>) -> Json<Vec<PipelineStatusBody>> {
    let models = &state.config().pipeline.models;
    let statuses = state.controller().loader().statuses().await;

    Json(
        statuses
            .into_iter()
            .map(|(direction, status)| PipelineStatusBody {
                direction,
                model: models.for_direction(direction).to_string(),
                status,
            })
            .collect(),
    )
}

pub async fn api_reload(
    State(state): State<Arc<AppState>>,
    Path(direction): Path<String>,
) -> Result<Json<PipelineStatusBody>, ApiError> {
    let direction: Direction = direction
        .parse()
        .map_err(|e: BilingualError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    let loader = state.controller().loader();
    loader
        .reload(direction)
        .await
        .map_err(|e| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    Ok(Json(PipelineStatusBody {
        direction,
        model: state.config().pipeline.models.for_direction(direction).to_string(),
        status: loader.status(direction).await,
    }))
}

/// Liveness endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Readiness endpoint
pub async fn readiness(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
