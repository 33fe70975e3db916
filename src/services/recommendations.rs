use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{MediaEntry, RecommendationReport, RecommendationRequest},
    services::{
        aggregate::AggregateStatistics,
        features::{vectorize, vectorize_all},
        model::{LinearModel, MIN_TRAINING_ENTRIES},
        providers::{fetch_candidates, CatalogProvider},
        ranking::{rank, RankingPolicy, ScoreScale, TitleExclusions},
    },
};

/// Everything learned from one viewer's rated history
#[derive(Debug, Clone)]
pub struct TrainedScorer {
    pub stats: AggregateStatistics,
    pub model: LinearModel,
    pub scale: ScoreScale,
    pub training_entries: usize,
}

impl TrainedScorer {
    /// Builds statistics and fits the model on the rated part of `history`.
    ///
    /// Unrated entries (score 0) are ignored by both steps. A title listed more
    /// than once (split Completed lists) counts once, with its first score.
    pub fn train(history: &[MediaEntry]) -> AppResult<Self> {
        let mut seen = HashSet::new();
        let rated: Vec<MediaEntry> = history
            .iter()
            .filter(|&entry| entry.is_rated() && seen.insert(entry.title.as_str()))
            .cloned()
            .collect();
        if rated.len() < MIN_TRAINING_ENTRIES {
            return Err(AppError::InsufficientTrainingData {
                required: MIN_TRAINING_ENTRIES,
                found: rated.len(),
            });
        }

        let stats = AggregateStatistics::from_history(&rated)?;

        let features: Vec<_> = rated.iter().map(|entry| vectorize(entry, &stats)).collect();
        let targets: Vec<f64> = rated
            .iter()
            .map(|entry| f64::from(entry.user_score))
            .collect();

        let model = LinearModel::fit(&features, &targets)?;
        let scale = ScoreScale::from_targets(&targets);

        Ok(Self {
            stats,
            model,
            scale,
            training_entries: rated.len(),
        })
    }

    /// Raw predictions, one per candidate
    pub fn predict(&self, candidates: &[MediaEntry]) -> Vec<f64> {
        self.model.predict(&vectorize_all(candidates, &self.stats))
    }
}

/// Runs the whole pipeline for one request.
///
/// fetch history → aggregate → fit → fetch season catalog → predict → rank.
/// Any failure aborts the run; nothing partial is returned.
pub async fn get_recommendations(
    provider: Arc<dyn CatalogProvider>,
    request: &RecommendationRequest,
    policy: &RankingPolicy,
    run_id: Uuid,
) -> AppResult<RecommendationReport> {
    let start = Instant::now();

    let lists = provider.fetch_user_lists(&request.username).await?;
    let scorer = TrainedScorer::train(&lists.completed)?;

    tracing::info!(
        run_id = %run_id,
        username = %request.username,
        training_entries = scorer.training_entries,
        model = ?scorer.model.summary(),
        "Model trained"
    );

    let candidates = fetch_candidates(Arc::clone(&provider), request.year, request.season).await?;
    let predictions = scorer.predict(&candidates);
    let exclusions = TitleExclusions::from_lists(&lists, request.include_dropped);

    let recommendations = rank(&candidates, &predictions, &scorer.scale, &exclusions, policy);

    tracing::info!(
        run_id = %run_id,
        username = %request.username,
        year = request.year,
        season = %request.season,
        candidates = candidates.len(),
        excluded_titles = exclusions.len(),
        recommended = recommendations.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Recommendations ranked"
    );

    Ok(RecommendationReport {
        run_id,
        username: request.username.clone(),
        year: request.year,
        season: request.season.to_string(),
        generated_at: Utc::now(),
        training_entries: scorer.training_entries,
        model: scorer.model.summary(),
        recommendations,
    })
}
