use std::collections::BTreeSet;

use super::model::{Song, year_bounds};

/// Headline numbers shown above the song table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub unique_artists: usize,
    /// `None` when no song in the input has a year.
    pub year_range: Option<(i64, i64)>,
    pub unique_genres: usize,
}

impl Summary {
    /// "1959-2007", or "n/a" without any year.
    pub fn year_range_label(&self) -> String {
        match self.year_range {
            Some((lo, hi)) => format!("{lo}-{hi}"),
            None => "n/a".to_string(),
        }
    }
}

/// Summarize a set of songs. Returns `None` for an empty input, so callers
/// must handle the "no data" state before showing metrics.
///
/// Missing artists and genres are not counted as distinct values.
pub fn summarize<'a, I>(songs: I) -> Option<Summary>
where
    I: IntoIterator<Item = &'a Song>,
    I::IntoIter: Clone,
{
    let songs = songs.into_iter();
    let total = songs.clone().count();
    if total == 0 {
        return None;
    }

    let artists: BTreeSet<&str> = songs.clone().filter_map(|s| s.artist_name.as_deref()).collect();
    let genres: BTreeSet<&str> = songs.clone().filter_map(|s| s.genre.as_deref()).collect();

    Some(Summary {
        total,
        unique_artists: artists.len(),
        year_range: year_bounds(songs),
        unique_genres: genres.len(),
    })
}
