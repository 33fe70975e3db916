//! Historical-performance statistics per genre, tag, studio and staff member.
//!
//! Built in two passes: [`StatsAccumulator`] sums scores over every rated
//! history entry, then [`StatsAccumulator::finalize`] turns the sums into means
//! and derives one fallback value per category. The resulting
//! [`AggregateStatistics`] is read-only.

use std::collections::HashMap;
use std::hash::Hash;

use crate::{
    error::{AppError, AppResult},
    models::MediaEntry,
};

/// Running total and weight for one category value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Tally {
    weight: f64,
    total: f64,
}

impl Tally {
    fn add(&mut self, score: f64, weight: f64) {
        self.weight += weight;
        self.total += score * weight;
    }
}

/// Finalized lookup table for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryScores<K: Eq + Hash> {
    values: HashMap<K, f64>,
    default: f64,
}

impl<K: Eq + Hash> CategoryScores<K> {
    /// Converts tallies into means; zero-weight tallies cannot be normalized and are dropped
    fn finalize(tallies: HashMap<K, Tally>, category: &'static str) -> AppResult<Self> {
        let values: HashMap<K, f64> = tallies
            .into_iter()
            .filter(|(_, tally)| tally.weight > 0.0)
            .map(|(key, tally)| (key, tally.total / tally.weight))
            .collect();

        if values.is_empty() {
            return Err(AppError::InsufficientData { category });
        }

        // Summed in sorted order so the default does not depend on hash iteration order
        let mut sorted: Vec<f64> = values.values().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let default = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Ok(Self { values, default })
    }

    /// Score for a known value
    pub fn get<Q>(&self, key: &Q) -> Option<f64>
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.values.get(key).copied()
    }

    /// Score for a value, falling back to the category default when unseen
    pub fn score<Q>(&self, key: &Q) -> f64
    where
        K: std::borrow::Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.get(key).unwrap_or(self.default)
    }

    /// Mean of every known value in the category
    pub fn default_value(&self) -> f64 {
        self.default
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }
}

/// Immutable per-category scores derived from a viewer's rated history
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStatistics {
    pub genres: CategoryScores<String>,
    pub tags: CategoryScores<String>,
    pub studios: CategoryScores<String>,
    pub staff: CategoryScores<i64>,
}

impl AggregateStatistics {
    /// Accumulates every rated entry, then finalizes
    pub fn from_history(history: &[MediaEntry]) -> AppResult<Self> {
        let mut accumulator = StatsAccumulator::default();
        for entry in history {
            accumulator.add(entry);
        }
        accumulator.finalize()
    }
}

/// First-pass running totals
#[derive(Debug, Default)]
pub struct StatsAccumulator {
    genres: HashMap<String, Tally>,
    tags: HashMap<String, Tally>,
    studios: HashMap<String, Tally>,
    staff: HashMap<i64, Tally>,
    entries: usize,
}

impl StatsAccumulator {
    /// Adds one history entry; unrated entries are skipped
    pub fn add(&mut self, entry: &MediaEntry) {
        if !entry.is_rated() {
            return;
        }
        let score = f64::from(entry.user_score);

        for genre in &entry.genres {
            self.genres.entry(genre.clone()).or_default().add(score, 1.0);
        }

        for tag in &entry.tags {
            self.tags
                .entry(tag.name.clone())
                .or_default()
                .add(score, f64::from(tag.rank));
        }

        for studio in entry.animation_studios() {
            self.studios
                .entry(studio.to_string())
                .or_default()
                .add(score, 1.0);
        }

        for staff_id in entry.key_staff() {
            self.staff.entry(staff_id).or_default().add(score, 1.0);
        }

        self.entries += 1;
    }

    /// Rated entries seen so far
    pub fn rated_entries(&self) -> usize {
        self.entries
    }

    /// Second pass: means per value plus per-category defaults
    pub fn finalize(self) -> AppResult<AggregateStatistics> {
        let stats = AggregateStatistics {
            genres: CategoryScores::finalize(self.genres, "genre")?,
            tags: CategoryScores::finalize(self.tags, "tag")?,
            studios: CategoryScores::finalize(self.studios, "studio")?,
            staff: CategoryScores::finalize(self.staff, "staff")?,
        };

        tracing::debug!(
            rated_entries = self.entries,
            genres = stats.genres.len(),
            tags = stats.tags.len(),
            studios = stats.studios.len(),
            staff = stats.staff.len(),
            "Aggregate statistics finalized"
        );

        Ok(stats)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{MediaTag, StaffCredit, Studio};

    /// Builds a history entry with one animation studio and one director
    pub(crate) fn entry(
        title: &str,
        score: u32,
        genres: &[&str],
        tags: &[(&str, u32)],
        studio: &str,
        director: i64,
    ) -> MediaEntry {
        MediaEntry {
            title: title.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            tags: tags
                .iter()
                .map(|(name, rank)| MediaTag {
                    name: name.to_string(),
                    rank: *rank,
                })
                .collect(),
            studios: vec![Studio {
                name: studio.to_string(),
                is_animation_studio: true,
            }],
            staff: vec![StaffCredit {
                staff_id: director,
                role: "Director".to_string(),
            }],
            community_score: Some(75),
            cover_image: None,
            site_url: None,
            user_score: score,
        }
    }

    fn history() -> Vec<MediaEntry> {
        vec![
            entry("A", 80, &["Action"], &[("Mecha", 90)], "Sunrise", 1),
            entry("B", 90, &["Action", "Drama"], &[("Mecha", 30), ("Space", 60)], "Bones", 2),
            entry("C", 60, &["Comedy"], &[("School", 0)], "Sunrise", 1),
        ]
    }

    #[test]
    fn test_genre_means() {
        let stats = AggregateStatistics::from_history(&history()).unwrap();

        assert_eq!(stats.genres.get("Action"), Some(85.0));
        assert_eq!(stats.genres.get("Drama"), Some(90.0));
        assert_eq!(stats.genres.get("Comedy"), Some(60.0));
        assert_eq!(stats.genres.default_value(), (85.0 + 90.0 + 60.0) / 3.0);
    }

    #[test]
    fn test_single_occurrence_equals_entry_score() {
        let stats = AggregateStatistics::from_history(&history()).unwrap();

        assert_eq!(stats.studios.get("Bones"), Some(90.0));
        assert_eq!(stats.staff.get(&2_i64), Some(90.0));
        assert_eq!(stats.genres.get("Drama"), Some(90.0));
    }

    #[test]
    fn test_tags_are_rank_weighted() {
        let stats = AggregateStatistics::from_history(&history()).unwrap();

        let expected = (80.0 * 90.0 + 90.0 * 30.0) / 120.0;
        assert_eq!(stats.tags.get("Mecha"), Some(expected));
        assert_eq!(stats.tags.get("Space"), Some(90.0));
    }

    #[test]
    fn test_zero_weight_tag_is_absent() {
        let stats = AggregateStatistics::from_history(&history()).unwrap();

        assert_eq!(stats.tags.get("School"), None);
        assert_eq!(stats.tags.len(), 2);
        assert_eq!(stats.tags.score("School"), stats.tags.default_value());
    }

    #[test]
    fn test_unrated_entries_have_no_influence() {
        let baseline = AggregateStatistics::from_history(&history()).unwrap();

        let mut with_unrated = history();
        with_unrated.push(entry("D", 0, &["Action", "Horror"], &[("Mecha", 100)], "Bones", 9));
        let stats = AggregateStatistics::from_history(&with_unrated).unwrap();

        assert_eq!(stats, baseline);
        assert_eq!(stats.genres.get("Horror"), None);
        assert_eq!(stats.staff.get(&9_i64), None);
    }

    #[test]
    fn test_non_key_roles_and_producers_ignored() {
        let mut record = entry("A", 70, &["Action"], &[("Mecha", 50)], "Sunrise", 1);
        record.staff.push(StaffCredit {
            staff_id: 42,
            role: "Key Animation".to_string(),
        });
        record.studios.push(Studio {
            name: "Bandai Visual".to_string(),
            is_animation_studio: false,
        });

        let stats = AggregateStatistics::from_history(&[record]).unwrap();

        assert_eq!(stats.staff.get(&42_i64), None);
        assert_eq!(stats.studios.get("Bandai Visual"), None);
        assert_eq!(stats.staff.len(), 1);
        assert_eq!(stats.studios.len(), 1);
    }

    #[test]
    fn test_empty_category_is_an_error() {
        let mut record = entry("A", 70, &["Action"], &[("Mecha", 50)], "Sunrise", 1);
        record.studios.clear();

        let err = AggregateStatistics::from_history(&[record]).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { category: "studio" }));
    }

    #[test]
    fn test_only_zero_rank_tags_is_an_error() {
        let record = entry("A", 70, &["Action"], &[("Mecha", 0)], "Sunrise", 1);

        let err = AggregateStatistics::from_history(&[record]).unwrap_err();
        assert!(matches!(err, AppError::InsufficientData { category: "tag" }));
    }

    #[test]
    fn test_accumulator_counts_rated_entries() {
        let mut accumulator = StatsAccumulator::default();
        for record in history() {
            accumulator.add(&record);
        }
        accumulator.add(&entry("Z", 0, &["Action"], &[], "Sunrise", 1));

        assert_eq!(accumulator.rated_entries(), 3);
    }
}
