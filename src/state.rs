use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;

use crate::config::AppConfig;
use crate::data::export;
use crate::data::filter::{FilterCriteria, filtered_indices};
use crate::data::loader::{LoadError, load_file};
use crate::data::model::Dataset;
use crate::data::stats::{Summary, summarize};

// ---------------------------------------------------------------------------
// Search mode
// ---------------------------------------------------------------------------

/// Whether the user has run a search yet.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchMode {
    /// No search triggered: the preview of the full dataset is shown.
    Idle,
    /// Results of the last triggered search.
    Searched {
        criteria: FilterCriteria,
        indices: Vec<usize>,
    },
}

// ---------------------------------------------------------------------------
// What the central panel should show
// ---------------------------------------------------------------------------

pub const NO_DATA_MESSAGE: &str =
    "No songs data available. Please check if your CSV file exists and contains data.";

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView<'a> {
    /// Nothing to show: the source is missing, unreadable or empty.
    NoData(String),
    /// First rows of the dataset, before any search.
    Preview {
        rows: Vec<usize>,
        caption: Option<String>,
    },
    /// A search ran and nothing matched.
    NoMatches,
    /// A search ran and found songs.
    Matches {
        indices: &'a [usize],
        summary: Summary,
    },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The session context: loaded data, widget values and search mode,
/// independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (empty when loading failed).
    pub dataset: Dataset,

    /// Why the dataset is empty, if loading failed.
    pub load_error: Option<LoadError>,

    /// Metrics over the whole dataset (None when it is empty).
    pub summary: Option<Summary>,

    /// Every genre in the dataset, sorted.
    pub genre_options: BTreeSet<String>,

    /// Smallest and largest year in the dataset.
    pub year_bounds: Option<(i64, i64)>,

    /// Current widget values; copied into fresh criteria on each search.
    pub inputs: FilterCriteria,

    pub mode: SearchMode,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Start a session by reading the configured data file.
    pub fn new(config: AppConfig) -> Self {
        let mut state = Self {
            config,
            dataset: Dataset::empty(),
            load_error: None,
            summary: None,
            genre_options: BTreeSet::new(),
            year_bounds: None,
            inputs: FilterCriteria::defaults_for(&Dataset::empty()),
            mode: SearchMode::Idle,
            status_message: None,
        };
        state.reload();
        state
    }

    /// Re-read the data file and reset filters and search mode.
    pub fn reload(&mut self) {
        self.read_source();
        self.inputs = FilterCriteria::defaults_for(&self.dataset);
        self.mode = SearchMode::Idle;
        self.status_message = None;
    }

    /// Read the configured file into the session. On failure the dataset is
    /// emptied and `load_error` says why. Widget values are left alone.
    fn read_source(&mut self) -> bool {
        let path = self.config.data_path.clone();
        match load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} songs from {} with columns {:?}",
                    dataset.len(),
                    path.display(),
                    dataset.columns
                );
                self.ingest(dataset);
                true
            }
            Err(e) => {
                match &e {
                    LoadError::DataSourceNotFound(_) => log::warn!("{e}"),
                    other => log::error!("Failed to load {}: {}", path.display(), other.user_message()),
                }
                self.ingest(Dataset::empty());
                self.load_error = Some(e);
                false
            }
        }
    }

    /// Compute global stats and widget options for a newly read dataset.
    fn ingest(&mut self, dataset: Dataset) {
        self.summary = summarize(&dataset.songs);
        self.genre_options = dataset.genres();
        self.year_bounds = dataset.year_bounds();
        self.dataset = dataset;
        self.load_error = None;
    }

    /// Re-read the source, then run the search with the current widget
    /// values. If the source can no longer be read the session falls back to
    /// the no-data view and the inputs are kept for the next attempt.
    pub fn search(&mut self) {
        let criteria = self.inputs.clone();
        self.status_message = None;
        if !self.read_source() {
            self.mode = SearchMode::Idle;
            return;
        }
        let indices = filtered_indices(&self.dataset, &criteria);
        log::info!(
            "Search artist={:?} track={:?} years={}-{} genres={}/{} → {} match(es)",
            criteria.artist_query,
            criteria.track_query,
            criteria.year_min,
            criteria.year_max,
            criteria.genres.len(),
            self.genre_options.len(),
            indices.len()
        );
        self.mode = SearchMode::Searched { criteria, indices };
    }

    /// Back to the preview with default filter values.
    pub fn clear(&mut self) {
        self.inputs = FilterCriteria::defaults_for(&self.dataset);
        self.mode = SearchMode::Idle;
        self.status_message = None;
    }

    /// Move the lower year bound, dragging the upper one along if needed.
    pub fn set_year_min(&mut self, year: i64) {
        self.inputs.year_min = year;
        if self.inputs.year_max < year {
            self.inputs.year_max = year;
        }
    }

    /// Move the upper year bound, dragging the lower one along if needed.
    pub fn set_year_max(&mut self, year: i64) {
        self.inputs.year_max = year;
        if self.inputs.year_min > year {
            self.inputs.year_min = year;
        }
    }

    /// Toggle a single genre in the selection.
    pub fn toggle_genre(&mut self, genre: &str) {
        if !self.inputs.genres.remove(genre) {
            self.inputs.genres.insert(genre.to_string());
        }
    }

    /// Select every genre.
    pub fn select_all_genres(&mut self) {
        self.inputs.genres = self.genre_options.clone();
    }

    /// Deselect all genres. A search will then match nothing.
    pub fn select_no_genres(&mut self) {
        self.inputs.genres.clear();
    }

    /// Decide what the result area shows for the current state.
    pub fn view(&self) -> ResultsView<'_> {
        if let Some(e) = &self.load_error {
            return ResultsView::NoData(e.user_message());
        }
        if self.dataset.is_empty() {
            return ResultsView::NoData(NO_DATA_MESSAGE.to_string());
        }

        match &self.mode {
            SearchMode::Idle => {
                let total = self.dataset.len();
                let shown = total.min(self.config.preview_rows);
                let caption = (total > shown).then(|| {
                    format!("Showing {shown} of {total} total songs. Use search to see more.")
                });
                ResultsView::Preview {
                    rows: (0..shown).collect(),
                    caption,
                }
            }
            SearchMode::Searched { indices, .. } => {
                match summarize(indices.iter().map(|&i| &self.dataset.songs[i])) {
                    Some(summary) => ResultsView::Matches { indices, summary },
                    None => ResultsView::NoMatches,
                }
            }
        }
    }

    /// Rows the download action would export, if a search found any.
    pub fn export_rows(&self) -> Option<&[usize]> {
        match &self.mode {
            SearchMode::Searched { indices, .. } if !indices.is_empty() => Some(indices.as_slice()),
            _ => None,
        }
    }

    /// Write the current search results to `path` and report the outcome in
    /// the status line.
    pub fn export_to(&mut self, path: &Path) -> Result<usize> {
        let Some(rows) = self.export_rows() else {
            anyhow::bail!("no search results to export");
        };
        let count = rows.len();
        match export::write_csv(path, &self.dataset, rows) {
            Ok(()) => {
                self.status_message = Some(format!("Saved {count} song(s) to {}", path.display()));
                Ok(count)
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e:#}"));
                Err(e)
            }
        }
    }
}
