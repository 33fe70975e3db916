use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Html,
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RunId,
    models::{RecommendationReport, RecommendationRequest, SeasonSelection, MIN_SEASON_YEAR},
    services::{recommendations, report},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub year: i32,
    pub season: String,
    #[serde(default)]
    pub include_dropped: bool,
}

/// Turns path and query input into a request the pipeline accepts
fn validate_request(
    username: &str,
    query: RecommendationQuery,
    current_year: i32,
) -> AppResult<RecommendationRequest> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".to_string()));
    }

    if !(MIN_SEASON_YEAR..=current_year).contains(&query.year) {
        return Err(AppError::InvalidInput(format!(
            "year must be between {} and {}, got {}",
            MIN_SEASON_YEAR, current_year, query.year
        )));
    }

    let season: SeasonSelection = query.season.parse().map_err(AppError::InvalidInput)?;

    Ok(RecommendationRequest {
        username: username.to_string(),
        year: query.year,
        season,
        include_dropped: query.include_dropped,
    })
}

async fn run_pipeline(
    state: &AppState,
    username: &str,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
    run_id: RunId,
) -> AppResult<RecommendationReport> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let request = validate_request(username, query, Utc::now().year())?;

    recommendations::get_recommendations(state.provider.clone(), &request, &state.policy, run_id.0)
        .await
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Ranked recommendations as JSON
pub async fn get_recommendations(
    State(state): State<AppState>,
    Extension(run_id): Extension<RunId>,
    Path(username): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationReport>> {
    let report = run_pipeline(&state, &username, query, run_id).await?;
    Ok(Json(report))
}

/// Ranked recommendations rendered as an HTML page, persisted when enabled
pub async fn get_report(
    State(state): State<AppState>,
    Extension(run_id): Extension<RunId>,
    Path(username): Path<String>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Html<String>> {
    let recommendation_report = run_pipeline(&state, &username, query, run_id).await?;
    let html = report::render_report(&recommendation_report)?;

    if state.reports.write {
        report::write_report(&state.reports.dir, &recommendation_report, &html).await?;
    }

    Ok(Html(html))
}
