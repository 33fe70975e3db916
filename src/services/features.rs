use crate::{models::MediaEntry, services::aggregate::AggregateStatistics};

/// Number of model inputs per entry
pub const FEATURE_COUNT: usize = 4;

/// Model input for one entry: genre, studio, tag and staff scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub genre: f64,
    pub studio: f64,
    pub tag: f64,
    pub staff: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [self.genre, self.studio, self.tag, self.staff]
    }
}

/// Maps an entry onto its feature vector. Only category fields are read, so
/// history and catalog entries vectorize the same way.
pub fn vectorize(entry: &MediaEntry, stats: &AggregateStatistics) -> FeatureVector {
    FeatureVector {
        genre: mean_or(
            entry.genres.iter().map(|genre| stats.genres.score(genre.as_str())),
            stats.genres.default_value(),
        ),
        studio: mean_or(
            entry.animation_studios().map(|studio| stats.studios.score(studio)),
            stats.studios.default_value(),
        ),
        tag: tag_score(entry, stats),
        staff: mean_or(
            entry.key_staff().map(|staff_id| stats.staff.score(&staff_id)),
            stats.staff.default_value(),
        ),
    }
}

pub fn vectorize_all(entries: &[MediaEntry], stats: &AggregateStatistics) -> Vec<FeatureVector> {
    entries.iter().map(|entry| vectorize(entry, stats)).collect()
}

/// Rank-weighted mean over the entry's tags.
///
/// Unseen tags contribute the tag default at their own rank, so a highly ranked
/// unknown tag pulls the score towards the default.
fn tag_score(entry: &MediaEntry, stats: &AggregateStatistics) -> f64 {
    let (weighted, weight) = entry.tags.iter().fold((0.0, 0.0), |(sum, total), tag| {
        let rank = f64::from(tag.rank);
        (sum + stats.tags.score(tag.name.as_str()) * rank, total + rank)
    });

    if weight > 0.0 {
        weighted / weight
    } else {
        stats.tags.default_value()
    }
}

fn mean_or(values: impl Iterator<Item = f64>, fallback: f64) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        fallback
    } else {
        sum / count as f64
    }
}
