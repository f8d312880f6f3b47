//! HTTP surface: one GET per page, one POST per prediction form.

use crate::config::AppConfig;
use crate::form;
use crate::pages::{self, Outcome, Page};
use crate::predict::{InferenceService, ModelKind};
use crate::record::build_record;
use crate::store::ModelStore;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde_json::json;
use std::{path::PathBuf, sync::Arc};

// ---------- Server state ----------

#[derive(Clone)]
pub struct AppState {
    pub inference: Arc<InferenceService>,
    pub assets_dir: Arc<PathBuf>,
    pub dashboard_url: Arc<String>,
}

impl AppState {
    pub fn new(cfg: &AppConfig, store: Arc<ModelStore>) -> Self {
        Self {
            inference: Arc::new(InferenceService::from_config(cfg, store)),
            assets_dir: Arc::new(cfg.assets_dir.clone()),
            dashboard_url: Arc::new(cfg.dashboard_url.clone()),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/pages/:slug", get(show_page).post(submit_page))
        .route("/assets/:file", get(asset))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

// ---------- Pages ----------

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::render_static(Page::Introduction, &state.dashboard_url).into_string())
}

pub async fn show_page(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let Some(page) = Page::from_slug(&slug) else {
        return not_found_page(&slug);
    };
    let Some(kind) = page.model_kind() else {
        return Html(pages::render_static(page, &state.dashboard_url).into_string()).into_response();
    };

    if let Err(e) = ensure_loaded(&state, kind).await {
        return unavailable(page, &e);
    }
    Html(pages::render_prediction(page, None, &Outcome::Nothing).into_string()).into_response()
}

pub async fn submit_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Form(raw): Form<Vec<(String, String)>>,
) -> Response {
    let Some(page) = Page::from_slug(&slug) else {
        return not_found_page(&slug);
    };
    let (Some(kind), Some(schema)) = (page.model_kind(), page.schema()) else {
        let body = pages::render_static(page, &state.dashboard_url).into_string();
        return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")], Html(body)).into_response();
    };

    if let Err(e) = ensure_loaded(&state, kind).await {
        return unavailable(page, &e);
    }

    let submission = form::submit(schema, &raw);
    let values = match &submission.result {
        Ok(values) => values,
        Err(errors) => {
            tracing::debug!("rejected {} form with {} errors", schema.id, errors.len());
            let body = pages::render_prediction(page, Some(&submission), &Outcome::Invalid(errors.clone()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(body.into_string())).into_response();
        }
    };

    let record = build_record(schema, values);
    let svc = Arc::clone(&state.inference);
    let outcome = match tokio::task::spawn_blocking(move || svc.predict(kind, &record)).await {
        Ok(Ok(prediction)) => {
            tracing::info!("{} prediction: {}", kind.as_str(), prediction);
            Outcome::Predicted(prediction)
        }
        Ok(Err(e)) => {
            tracing::warn!("{} prediction failed: {}", kind.as_str(), e);
            Outcome::Failed(e.to_string())
        }
        Err(e) => {
            tracing::error!("{} prediction task aborted: {}", kind.as_str(), e);
            Outcome::Failed(e.to_string())
        }
    };

    Html(pages::render_prediction(page, Some(&submission), &outcome).into_string()).into_response()
}

/// Loads the page's model off the async runtime; cached after the first call.
async fn ensure_loaded(state: &AppState, kind: ModelKind) -> Result<(), String> {
    let svc = Arc::clone(&state.inference);
    match tokio::task::spawn_blocking(move || svc.model(kind).map(|_| ())).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::error!("{} model unavailable: {}", kind.as_str(), e);
            Err(e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}

fn unavailable(page: Page, error: &str) -> Response {
    let body = pages::render_unavailable(page, error).into_string();
    (StatusCode::SERVICE_UNAVAILABLE, Html(body)).into_response()
}

fn not_found_page(path: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(pages::render_not_found(path).into_string())).into_response()
}

pub async fn not_found(uri: Uri) -> Response {
    not_found_page(uri.path())
}

// ---------- Assets ----------

fn content_type(file: &str) -> &'static str {
    match file.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("css") => "text/css",
        _ => "application/octet-stream",
    }
}

/// A bare file name: no separators, no parent hops, no hidden files.
fn is_safe_name(file: &str) -> bool {
    !file.is_empty() && !file.starts_with('.') && !file.contains(['/', '\\']) && !file.contains("..")
}

pub async fn asset(State(state): State<AppState>, Path(file): Path<String>) -> Response {
    if !is_safe_name(&file) {
        return StatusCode::NOT_FOUND.into_response();
    }
    let path = state.assets_dir.join(&file);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&file))], bytes).into_response(),
        Err(e) => {
            tracing::debug!("asset {} not served: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

// ---------- Health ----------

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "models": {
            "fuel_type": state.inference.is_loaded(ModelKind::FuelType),
            "engine_hp": state.inference.is_loaded(ModelKind::EngineHp),
        }
    }))
}
