use serde::Deserialize;
use std::path::PathBuf;

use crate::services::ranking::{CommunityScorePolicy, RankingPolicy};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// AniList GraphQL endpoint
    #[serde(default = "default_anilist_api_url")]
    pub anilist_api_url: String,

    /// Redis connection URL; season catalogs are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Upper bound for a single upstream request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory that receives rendered HTML reports
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Persist every rendered report under `report_dir`
    #[serde(default = "default_write_reports")]
    pub write_reports: bool,

    /// Minimum community average score a candidate needs
    #[serde(default = "default_community_score_threshold")]
    pub community_score_threshold: u32,

    /// How candidates without a community score are gated
    #[serde(default)]
    pub community_score_policy: CommunityScorePolicy,

    /// Normalized percentages below this are dropped
    #[serde(default)]
    pub min_match_percent: f64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_anilist_api_url() -> String {
    "https://graphql.anilist.co".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("Predictions")
}

fn default_write_reports() -> bool {
    true
}

fn default_community_score_threshold() -> u32 {
    65
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn ranking_policy(&self) -> RankingPolicy {
        RankingPolicy {
            community_score_threshold: self.community_score_threshold,
            community_score_policy: self.community_score_policy,
            min_match_percent: self.min_match_percent,
        }
    }
}
