/// Catalog data provider abstraction
///
/// The recommender only needs two things from upstream: a viewer's watch-status
/// lists and the titles airing in a season. Providers return both already
/// converted into [`MediaEntry`] records.
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::{
    error::{AppError, AppResult},
    models::{MediaEntry, Season, SeasonSelection, UserLists},
};

pub mod anilist;

pub use anilist::AniListProvider;

/// Trait for anime catalog providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the viewer's Completed and Dropped lists with raw 0-100 scores
    ///
    /// Fails with `UserNotFound` when the user or their completed list does not exist.
    async fn fetch_user_lists(&self, username: &str) -> AppResult<UserLists>;

    /// Fetch every TV title airing in one season, in catalog order
    async fn fetch_season(&self, year: i32, season: Season) -> AppResult<Vec<MediaEntry>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches the candidate catalog for a season selection.
///
/// Each season is fetched on its own task and results are concatenated in
/// season order once all of them finished. Whichever task fails first aborts
/// the rest and fails the whole call.
pub async fn fetch_candidates(
    provider: Arc<dyn CatalogProvider>,
    year: i32,
    selection: SeasonSelection,
) -> AppResult<Vec<MediaEntry>> {
    let seasons = selection.seasons();
    let mut tasks = JoinSet::new();

    for (index, &season) in seasons.iter().enumerate() {
        let provider = Arc::clone(&provider);
        tasks.spawn(async move { (index, provider.fetch_season(year, season).await) });
    }

    let mut catalogs: Vec<Vec<MediaEntry>> = vec![Vec::new(); seasons.len()];

    while let Some(joined) = tasks.join_next().await {
        let (index, outcome) = joined.map_err(|e| AppError::Internal(e.to_string()))?;
        let season = seasons[index];

        match outcome {
            Ok(entries) => {
                tracing::debug!(
                    year,
                    season = %season,
                    entries = entries.len(),
                    provider = provider.name(),
                    "Season catalog fetched"
                );
                catalogs[index] = entries;
            }
            Err(e) => {
                tracing::error!(
                    year,
                    season = %season,
                    error = %e,
                    provider = provider.name(),
                    "Season catalog fetch failed"
                );
                tasks.abort_all();
                return Err(e);
            }
        }
    }

    Ok(catalogs.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn titled(title: &str) -> MediaEntry {
        MediaEntry {
            title: title.to_string(),
            genres: vec![],
            tags: vec![],
            studios: vec![],
            staff: vec![],
            community_score: None,
            cover_image: None,
            site_url: None,
            user_score: 0,
        }
    }

    #[tokio::test]
    async fn test_single_season_fetch() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_season()
            .with(eq(2024), eq(Season::Spring))
            .times(1)
            .returning(|_, _| Ok(vec![titled("Dungeon Meshi")]));
        provider.expect_name().return_const("mock");

        let provider: Arc<dyn CatalogProvider> = Arc::new(provider);
        let candidates =
            fetch_candidates(provider, 2024, SeasonSelection::Single(Season::Spring))
                .await
                .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Dungeon Meshi");
    }

    #[tokio::test]
    async fn test_all_seasons_concatenate_in_order() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_fetch_season()
            .times(4)
            .returning(|_, season| Ok(vec![titled(season.as_str()), titled("shared")]));
        provider.expect_name().return_const("mock");

        let provider: Arc<dyn CatalogProvider> = Arc::new(provider);
        let candidates = fetch_candidates(provider, 2023, SeasonSelection::All)
            .await
            .unwrap();

        let titles: Vec<&str> = candidates.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["WINTER", "shared", "SPRING", "shared", "SUMMER", "shared", "FALL", "shared"]
        );
    }

    #[tokio::test]
    async fn test_one_failed_season_fails_everything() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_fetch_season().returning(|_, season| {
            if season == Season::Summer {
                Err(AppError::ExternalApi("upstream returned 500".to_string()))
            } else {
                Ok(vec![titled(season.as_str())])
            }
        });
        provider.expect_name().return_const("mock");

        let provider: Arc<dyn CatalogProvider> = Arc::new(provider);
        let result = fetch_candidates(provider, 2023, SeasonSelection::All).await;

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    /// Fall fails at once; every other season hangs far past the test deadline
    struct FallFailsFast;

    #[async_trait::async_trait]
    impl CatalogProvider for FallFailsFast {
        async fn fetch_user_lists(&self, username: &str) -> AppResult<UserLists> {
            Err(AppError::UserNotFound(username.to_string()))
        }

        async fn fetch_season(&self, _year: i32, season: Season) -> AppResult<Vec<MediaEntry>> {
            if season == Season::Fall {
                return Err(AppError::ExternalApi("upstream returned 500".to_string()));
            }
            tokio::time::sleep(std::time::Duration::from_secs(600)).await;
            Ok(vec![titled(season.as_str())])
        }

        fn name(&self) -> &'static str {
            "fall-fails-fast"
        }
    }

    #[tokio::test]
    async fn test_late_season_failure_is_reported_without_waiting() {
        let provider: Arc<dyn CatalogProvider> = Arc::new(FallFailsFast);

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            fetch_candidates(provider, 2023, SeasonSelection::All),
        )
        .await
        .expect("fetch should fail before the slow seasons finish");

        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
