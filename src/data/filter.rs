use std::collections::BTreeSet;

use super::model::{Dataset, Song};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// The user's search criteria, captured when a search is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the artist name; empty means no constraint.
    pub artist_query: String,
    /// Case-insensitive substring of the track name; empty means no constraint.
    pub track_query: String,
    /// Inclusive lower year bound.
    pub year_min: i64,
    /// Inclusive upper year bound.
    pub year_max: i64,
    /// Allowed genres. An empty set matches nothing.
    pub genres: BTreeSet<String>,
}

impl FilterCriteria {
    /// Criteria that keep every row of `dataset`: no text queries, the full
    /// year range and all genres selected.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let (year_min, year_max) = dataset.year_bounds().unwrap_or((0, 0));
        FilterCriteria {
            artist_query: String::new(),
            track_query: String::new(),
            year_min,
            year_max,
            genres: dataset.genres(),
        }
    }

    /// The criteria as independent per-row stages, in the default order.
    pub fn stages(&self) -> Vec<FilterStage<'_>> {
        let mut stages = Vec::with_capacity(4);
        if !self.artist_query.is_empty() {
            stages.push(FilterStage::Artist(&self.artist_query));
        }
        if !self.track_query.is_empty() {
            stages.push(FilterStage::Track(&self.track_query));
        }
        stages.push(FilterStage::Years(self.year_min, self.year_max));
        stages.push(FilterStage::Genres(&self.genres));
        stages
    }
}

// ---------------------------------------------------------------------------
// Filter stages
// ---------------------------------------------------------------------------

/// One predicate of the conjunction. Stages only look at a single row, so
/// they can be applied in any order.
#[derive(Debug, Clone, Copy)]
pub enum FilterStage<'a> {
    Artist(&'a str),
    Track(&'a str),
    Years(i64, i64),
    Genres(&'a BTreeSet<String>),
}

impl FilterStage<'_> {
    /// A song passes a stage when:
    /// * Artist / Track: the field contains the query, ignoring case.
    ///   Missing text never matches.
    /// * Years: `min <= year <= max`. A missing year never matches.
    /// * Genres: the genre is in the set. An empty set hides everything.
    pub fn matches(&self, song: &Song) -> bool {
        match self {
            FilterStage::Artist(q) => contains_ignore_case(song.artist_name.as_deref(), q),
            FilterStage::Track(q) => contains_ignore_case(song.track_name.as_deref(), q),
            FilterStage::Years(min, max) => song.year.is_some_and(|y| *min <= y && y <= *max),
            FilterStage::Genres(selected) => song
                .genre
                .as_ref()
                .is_some_and(|g| selected.contains(g)),
        }
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

// ---------------------------------------------------------------------------
// Applying criteria
// ---------------------------------------------------------------------------

/// Return indices of songs that pass all stages, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    narrow(dataset, (0..dataset.len()).collect(), &criteria.stages())
}

/// Narrow `candidates` stage by stage, each stage seeing only the survivors
/// of the previous one.
pub fn narrow(dataset: &Dataset, candidates: Vec<usize>, stages: &[FilterStage<'_>]) -> Vec<usize> {
    stages.iter().fold(candidates, |survivors, stage| {
        survivors
            .into_iter()
            .filter(|&i| stage.matches(&dataset.songs[i]))
            .collect()
    })
}

/// A new dataset holding the matching songs. The source is left untouched.
pub fn apply(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    dataset.subset(&filtered_indices(dataset, criteria))
}
