//! HTTP handlers for the aivis API and pages.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use aivis_core::{InputError, Mode, ReportView, url_utils};

use crate::AppState;
use crate::checkout::CheckoutRequest;
use crate::error::ApiError;

const FRONTEND_HTML: &str = include_str!("frontend.html");

/// Body of `POST /api/check` and query of `GET /api/check`
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PayResponse {
    pub session_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    #[serde(default)]
    pub mode: Option<String>,
}

/// Absent or blank mode means quick.
fn parse_mode(raw: Option<&str>) -> Result<Mode, InputError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Mode::default()),
        Some(mode) => mode.parse(),
    }
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

async fn run_check(state: &AppState, request: CheckRequest) -> Result<Json<ReportView>, ApiError> {
    let mode = parse_mode(request.mode.as_deref())?;
    let url = request.url.unwrap_or_default();

    let report = state.analyzer.analyze(state.fetcher.as_ref(), &url).await?;
    info!(url = %report.url, mode = %mode, score = report.score, "check served");

    Ok(Json(report.view(mode)))
}

/// POST /api/check
pub async fn check_post(
    State(state): State<AppState>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<ReportView>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
    run_check(&state, request).await
}

/// GET /api/check?url=&mode=
pub async fn check_get(
    State(state): State<AppState>,
    Query(request): Query<CheckRequest>,
) -> Result<Json<ReportView>, ApiError> {
    run_check(&state, request).await
}

/// POST /api/pay
pub async fn pay(
    State(state): State<AppState>,
    body: Result<Json<PayRequest>, JsonRejection>,
) -> Result<Json<PayResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;

    let mode = parse_mode(request.mode.as_deref())?;
    let url = url_utils::normalize_target_url(request.url.as_deref().unwrap_or_default())?;
    let email = request
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty());

    if mode == Mode::Full {
        match &email {
            Some(email) if is_plausible_email(email) => {}
            Some(email) => return Err(ApiError::InvalidEmail(email.clone())),
            None => return Err(ApiError::InvalidEmail(String::new())),
        }
    }

    let checkout = CheckoutRequest {
        mode,
        url: url.to_string(),
        email,
    };
    let session = state.checkout.create_session(&checkout)?;
    info!(
        provider = state.checkout.name(),
        session_id = %session.session_id,
        mode = %mode,
        "checkout session created"
    );

    Ok(Json(PayResponse {
        session_url: session.session_url,
    }))
}

/// POST /api/session
pub async fn session() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true, "session": null }))
}

/// GET /
pub async fn index() -> Html<String> {
    Html(FRONTEND_HTML.replace("${version}", env!("CARGO_PKG_VERSION")))
}

/// GET /success?mode=
pub async fn success(Query(query): Query<SuccessQuery>) -> Html<String> {
    let mode = parse_mode(query.mode.as_deref()).unwrap_or_default();
    let (product, blurb) = match mode {
        Mode::Quick => (
            "Quick Check",
            "Your quick AI visibility check is unlocked.",
        ),
        Mode::Full => (
            "Business Pro Audit",
            "Your full 15-point audit is unlocked. We will email the report shortly.",
        ),
    };

    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head><meta charset="utf-8"><title>Payment successful - aivis</title></head>
<body style="font-family: system-ui, sans-serif; max-width: 40rem; margin: 4rem auto;">
  <h1>Payment successful</h1>
  <p><strong>{product}</strong></p>
  <p>{blurb}</p>
  <p><a href="/?mode={mode}">Back to the checker</a></p>
</body>
</html>"#
    ))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}
