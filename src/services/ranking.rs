use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{MediaEntry, Recommendation, UserLists};

/// Community score assumed for catalog entries AniList has not scored yet
pub const IMPUTED_COMMUNITY_SCORE: u32 = 65;

/// How a missing community score is treated by the quality gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunityScorePolicy {
    /// Missing scores are imputed to 65 and pass the default gate
    #[default]
    Imputed,
    /// Missing scores always fail the gate
    Strict,
}

/// Filters applied to scored candidates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    pub community_score_threshold: u32,
    pub community_score_policy: CommunityScorePolicy,
    pub min_match_percent: f64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            community_score_threshold: 65,
            community_score_policy: CommunityScorePolicy::Imputed,
            min_match_percent: 0.0,
        }
    }
}

impl RankingPolicy {
    pub fn passes_community_gate(&self, community_score: Option<u32>) -> bool {
        let effective = match self.community_score_policy {
            CommunityScorePolicy::Imputed => Some(community_score.unwrap_or(IMPUTED_COMMUNITY_SCORE)),
            CommunityScorePolicy::Strict => community_score,
        };
        effective.is_some_and(|score| score >= self.community_score_threshold)
    }
}

/// Rescales raw predictions against the viewer's own score distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreScale {
    pub mean: f64,
    pub std_dev: f64,
}

impl ScoreScale {
    /// Mean and population standard deviation of the training targets
    pub fn from_targets(targets: &[f64]) -> Self {
        if targets.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        let n = targets.len() as f64;
        let mean = targets.iter().sum::<f64>() / n;
        let variance = targets.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// Maps a raw prediction to a percentage in [0, 100].
    ///
    /// The mean lands on 50% and one standard deviation above it on 100%. A
    /// viewer who gives every show the same score has no spread, so everything
    /// maps to 50%.
    pub fn normalize(&self, raw: f64) -> f64 {
        if self.std_dev <= f64::EPSILON {
            return 50.0;
        }
        let pct = ((raw - self.mean + self.std_dev) / (2.0 * self.std_dev)) * 100.0;
        if pct.is_nan() {
            return 0.0;
        }
        pct.clamp(0.0, 100.0)
    }
}

/// Titles the viewer has already seen or abandoned
#[derive(Debug, Clone, Default)]
pub struct TitleExclusions {
    titles: HashSet<String>,
}

impl TitleExclusions {
    pub fn from_lists(lists: &UserLists, include_dropped: bool) -> Self {
        let mut titles: HashSet<String> =
            lists.completed.iter().map(|entry| entry.title.clone()).collect();
        if !include_dropped {
            titles.extend(lists.dropped.iter().map(|entry| entry.title.clone()));
        }
        Self { titles }
    }

    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    pub(crate) fn len(&self) -> usize {
        self.titles.len()
    }
}

/// Filters, normalizes and orders candidates.
///
/// `predictions[i]` is the raw model output for `candidates[i]`. Ties keep catalog order.
pub fn rank(
    candidates: &[MediaEntry],
    predictions: &[f64],
    scale: &ScoreScale,
    exclusions: &TitleExclusions,
    policy: &RankingPolicy,
) -> Vec<Recommendation> {
    debug_assert_eq!(candidates.len(), predictions.len());

    let mut scored: Vec<(&MediaEntry, f64)> = candidates
        .iter()
        .zip(predictions.iter())
        .filter(|(entry, _)| policy.passes_community_gate(entry.community_score))
        .filter(|(entry, _)| !exclusions.contains(&entry.title))
        .map(|(entry, raw)| (entry, scale.normalize(*raw)))
        .filter(|(_, pct)| *pct >= policy.min_match_percent)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (entry, pct))| Recommendation {
            rank: i + 1,
            title: entry.title.clone(),
            image: entry.cover_image.clone(),
            url: entry.site_url.clone(),
            match_percent: pct,
            predicted: format!("{}%", pct.round() as u32),
            community_score: entry.community_score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, community: Option<u32>) -> MediaEntry {
        MediaEntry {
            title: title.to_string(),
            genres: vec![],
            tags: vec![],
            studios: vec![],
            staff: vec![],
            community_score: community,
            cover_image: Some(format!("https://img.example/{title}.jpg")),
            site_url: None,
            user_score: 0,
        }
    }

    fn scale() -> ScoreScale {
        ScoreScale {
            mean: 70.0,
            std_dev: 10.0,
        }
    }

    #[test]
    fn test_scale_from_targets() {
        let scale = ScoreScale::from_targets(&[60.0, 80.0]);
        assert_eq!(scale.mean, 70.0);
        assert_eq!(scale.std_dev, 10.0);
    }

    #[test]
    fn test_normalize_centers_on_mean() {
        let scale = scale();
        assert_eq!(scale.normalize(70.0), 50.0);
        assert_eq!(scale.normalize(80.0), 100.0);
        assert_eq!(scale.normalize(60.0), 0.0);
    }

    #[test]
    fn test_normalize_clamps_extremes() {
        let scale = scale();
        for raw in [-1e9, -500.0, 0.0, 55.0, 95.0, 1e9, f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let pct = scale.normalize(raw);
            assert!((0.0..=100.0).contains(&pct), "{raw} -> {pct}");
        }
    }

    #[test]
    fn test_normalize_is_monotonic() {
        let scale = scale();
        let raws = [-20.0, 10.0, 61.5, 65.0, 69.9, 70.0, 75.2, 79.99, 90.0, 300.0];
        for pair in raws.windows(2) {
            assert!(scale.normalize(pair[1]) >= scale.normalize(pair[0]));
        }
    }

    #[test]
    fn test_zero_spread_maps_to_midpoint() {
        let scale = ScoreScale::from_targets(&[80.0, 80.0, 80.0]);
        assert_eq!(scale.normalize(95.0), 50.0);
    }

    #[test]
    fn test_community_gate_policies() {
        let imputed = RankingPolicy::default();
        assert!(imputed.passes_community_gate(Some(65)));
        assert!(imputed.passes_community_gate(None));
        assert!(!imputed.passes_community_gate(Some(64)));

        let strict = RankingPolicy {
            community_score_policy: CommunityScorePolicy::Strict,
            ..RankingPolicy::default()
        };
        assert!(strict.passes_community_gate(Some(70)));
        assert!(!strict.passes_community_gate(None));
    }

    #[test]
    fn test_rank_filters_and_orders() {
        let candidates = vec![
            candidate("Low Community", Some(50)),
            candidate("Middle", Some(70)),
            candidate("Top", Some(88)),
            candidate("Unscored", None),
            candidate("Already Seen", Some(90)),
        ];
        let predictions = vec![90.0, 72.0, 78.0, 66.0, 99.0];
        let lists = UserLists {
            completed: vec![candidate("Already Seen", Some(90))],
            dropped: vec![],
        };
        let exclusions = TitleExclusions::from_lists(&lists, false);

        let ranked = rank(
            &candidates,
            &predictions,
            &scale(),
            &exclusions,
            &RankingPolicy::default(),
        );

        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Top", "Middle", "Unscored"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].predicted, "90%");
        assert_eq!(ranked[1].predicted, "60%");
        assert_eq!(ranked[2].predicted, "30%");
        assert_eq!(ranked[2].community_score, None);
        assert_eq!(
            ranked[0].image.as_deref(),
            Some("https://img.example/Top.jpg")
        );
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let candidates = vec![
            candidate("First", Some(80)),
            candidate("Best", Some(80)),
            candidate("Second", Some(80)),
        ];
        let predictions = vec![74.4, 90.0, 74.4];

        let ranked = rank(
            &candidates,
            &predictions,
            &scale(),
            &TitleExclusions::default(),
            &RankingPolicy::default(),
        );

        let titles: Vec<&str> = ranked.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Best", "First", "Second"]);
        assert_eq!(ranked[1].predicted, "72%");
        assert_eq!(ranked[2].predicted, "72%");
    }

    #[test]
    fn test_dropped_titles_excluded_unless_requested() {
        let lists = UserLists {
            completed: vec![candidate("Done", Some(80))],
            dropped: vec![candidate("Gave Up", Some(80))],
        };

        let excluding = TitleExclusions::from_lists(&lists, false);
        assert!(excluding.contains("Done"));
        assert!(excluding.contains("Gave Up"));

        let including = TitleExclusions::from_lists(&lists, true);
        assert!(including.contains("Done"));
        assert!(!including.contains("Gave Up"));
    }

    #[test]
    fn test_completed_title_never_recommended() {
        let candidates = vec![candidate("Done", Some(95))];
        let lists = UserLists {
            completed: vec![candidate("Done", Some(95))],
            dropped: vec![],
        };

        let ranked = rank(
            &candidates,
            &[1e6],
            &scale(),
            &TitleExclusions::from_lists(&lists, true),
            &RankingPolicy::default(),
        );

        assert!(ranked.is_empty());
    }

    #[test]
    fn test_min_match_percent_floor() {
        let candidates = vec![candidate("Weak", Some(80)), candidate("Strong", Some(80))];
        let policy = RankingPolicy {
            min_match_percent: 50.0,
            ..RankingPolicy::default()
        };

        let ranked = rank(
            &candidates,
            &[65.0, 75.0],
            &scale(),
            &TitleExclusions::default(),
            &policy,
        );

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "Strong");
    }
}
