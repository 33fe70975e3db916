use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod anilist;
pub mod media;
pub mod season;

pub use media::{KeyRole, MediaEntry, MediaTag, StaffCredit, Studio, UserLists};
pub use season::{Season, SeasonSelection, MIN_SEASON_YEAR};

/// A validated recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub username: String,
    pub year: i32,
    pub season: SeasonSelection,
    pub include_dropped: bool,
}

/// One ranked, not-yet-watched title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    /// 1-based position in the final ordering
    pub rank: usize,
    pub title: String,
    pub image: Option<String>,
    pub url: Option<String>,
    /// Normalized percentage in [0, 100]
    pub match_percent: f64,
    /// `match_percent` rounded for display, e.g. "72%"
    pub predicted: String,
    pub community_score: Option<u32>,
}

/// Fitted regression parameters, reported alongside the results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSummary {
    pub intercept: f64,
    /// Weights for genre, studio, tag and staff features, in that order
    pub coefficients: [f64; 4],
}

/// Response with the ordered recommendations for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub run_id: Uuid,
    pub username: String,
    pub year: i32,
    pub season: String,
    pub generated_at: DateTime<Utc>,
    /// Rated history entries the model was fitted on
    pub training_entries: usize,
    pub model: ModelSummary,
    pub recommendations: Vec<Recommendation>,
}
