use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    config::Config,
    services::{providers::CatalogProvider, ranking::RankingPolicy},
};

/// Where rendered HTML reports go, if anywhere
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub dir: PathBuf,
    pub write: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CatalogProvider>,
    pub policy: RankingPolicy,
    pub reports: ReportSettings,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        policy: RankingPolicy,
        reports: ReportSettings,
    ) -> Self {
        Self {
            provider,
            policy,
            reports,
        }
    }

    /// State wired from the loaded configuration
    pub fn from_config(provider: Arc<dyn CatalogProvider>, config: &Config) -> Self {
        Self::new(
            provider,
            config.ranking_policy(),
            ReportSettings {
                dir: config.report_dir.clone(),
                write: config.write_reports,
            },
        )
    }
}
