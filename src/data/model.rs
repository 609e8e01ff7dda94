use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const ID: &str = "id";
pub const ARTIST_NAME: &str = "artist_name";
pub const TRACK_NAME: &str = "track_name";
pub const TRACK_ID: &str = "track_id";
pub const YEAR: &str = "year";
pub const GENRE: &str = "genre";

/// Columns every song source must provide.
pub const REQUIRED_COLUMNS: [&str; 6] = [ARTIST_NAME, TRACK_NAME, TRACK_ID, YEAR, GENRE, ID];

/// Columns always kept as text, whatever their values look like.
pub const TEXT_COLUMNS: [&str; 4] = [ARTIST_NAME, TRACK_NAME, TRACK_ID, GENRE];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell; CSV columns get their type from [`ColumnKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Integer view of the cell. Integral floats (`2010.0`) and numeric text
    /// are accepted since a column with gaps or odd entries is not read as
    /// integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            CellValue::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    /// Text view of the cell. Null has no text; numbers are rendered, so an
    /// all-digit artist or track name still matches substring queries.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnKind – type of a whole source column
// ---------------------------------------------------------------------------

/// Cell type shared by every value of a column. A column is typed only when
/// every non-empty value parses and renders back to the same text, so a
/// string column keeps `007`, `1.50` or `Infinity` as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    /// Pick the narrowest kind that fits every value of a column.
    pub fn infer<'a>(values: impl Iterator<Item = &'a str> + Clone) -> Self {
        let mut present = values.filter(|v| !v.is_empty());
        if present.clone().next().is_none() {
            return ColumnKind::Text;
        }
        if present
            .clone()
            .all(|v| v.parse::<i64>().is_ok_and(|i| i.to_string() == v))
        {
            return ColumnKind::Integer;
        }
        if present.clone().all(|v| {
            v.parse::<f64>()
                .is_ok_and(|f| f.is_finite() && f.to_string() == v)
        }) {
            return ColumnKind::Float;
        }
        if present.all(|v| v == "true" || v == "false") {
            return ColumnKind::Bool;
        }
        ColumnKind::Text
    }

    /// Kind for a named column. Text fields of a song are always text.
    pub fn for_column<'a>(column: &str, values: impl Iterator<Item = &'a str> + Clone) -> Self {
        if TEXT_COLUMNS.contains(&column) {
            ColumnKind::Text
        } else {
            ColumnKind::infer(values)
        }
    }

    /// Parse one value of a column of this kind. Empty text is null.
    pub fn parse(self, s: &str) -> CellValue {
        if s.is_empty() {
            return CellValue::Null;
        }
        let parsed = match self {
            ColumnKind::Integer => s.parse().ok().map(CellValue::Integer),
            ColumnKind::Float => s.parse().ok().map(CellValue::Float),
            ColumnKind::Bool => s.parse().ok().map(CellValue::Bool),
            ColumnKind::Text => None,
        };
        parsed.unwrap_or_else(|| CellValue::String(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Song – one row of the dataset
// ---------------------------------------------------------------------------

/// A single song. Typed fields are `None` when the cell is empty or its type
/// does not fit (e.g. a non-numeric year); `cells` keeps every source cell
/// verbatim for display and export.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub id: Option<i64>,
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    pub track_id: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    /// Raw cells keyed by column name, including columns beyond the required six.
    pub cells: BTreeMap<String, CellValue>,
}

impl Song {
    /// Build a song from its raw cells.
    pub fn from_cells(cells: BTreeMap<String, CellValue>) -> Self {
        let text = |col: &str| cells.get(col).and_then(CellValue::as_text);
        let int = |col: &str| cells.get(col).and_then(CellValue::as_i64);
        Song {
            id: int(ID),
            artist_name: text(ARTIST_NAME),
            track_name: text(TRACK_NAME),
            track_id: text(TRACK_ID),
            year: int(YEAR),
            genre: text(GENRE),
            cells,
        }
    }

    /// Build a song from typed values only.
    pub fn new(
        id: i64,
        artist_name: &str,
        track_name: &str,
        track_id: &str,
        year: i64,
        genre: &str,
    ) -> Self {
        let cells = BTreeMap::from([
            (ID.to_string(), CellValue::Integer(id)),
            (ARTIST_NAME.to_string(), CellValue::String(artist_name.to_string())),
            (TRACK_NAME.to_string(), CellValue::String(track_name.to_string())),
            (TRACK_ID.to_string(), CellValue::String(track_id.to_string())),
            (YEAR.to_string(), CellValue::Integer(year)),
            (GENRE.to_string(), CellValue::String(genre.to_string())),
        ]);
        Song::from_cells(cells)
    }

    /// Cell for a column, `Null` when the row has no value for it.
    pub fn cell(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded songs plus the source column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub songs: Vec<Song>,
    /// Column names in source order.
    pub columns: Vec<String>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, songs: Vec<Song>) -> Self {
        Dataset { songs, columns }
    }

    /// Dataset with the required columns and no rows.
    pub fn empty() -> Self {
        Dataset {
            songs: Vec::new(),
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Build a dataset from typed songs using the required column order.
    pub fn from_songs(songs: Vec<Song>) -> Self {
        Dataset {
            songs,
            ..Dataset::empty()
        }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Sorted distinct genres (nulls excluded).
    pub fn genres(&self) -> BTreeSet<String> {
        self.songs.iter().filter_map(|s| s.genre.clone()).collect()
    }

    /// Smallest and largest year, `None` when no row has a year.
    pub fn year_bounds(&self) -> Option<(i64, i64)> {
        year_bounds(self.songs.iter())
    }

    /// New dataset holding the rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            songs: indices.iter().map(|&i| self.songs[i].clone()).collect(),
            columns: self.columns.clone(),
        }
    }
}

pub(crate) fn year_bounds<'a>(songs: impl Iterator<Item = &'a Song>) -> Option<(i64, i64)> {
    songs.filter_map(|s| s.year).fold(None, |acc, y| match acc {
        None => Some((y, y)),
        Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(values: &[&str]) -> ColumnKind {
        ColumnKind::infer(values.iter().copied())
    }

    #[test]
    fn column_kind_needs_every_value_to_fit() {
        assert_eq!(kind(&["2010", "", "1999"]), ColumnKind::Integer);
        assert_eq!(kind(&["0.5", "12", "0.25"]), ColumnKind::Float);
        assert_eq!(kind(&["true", "false"]), ColumnKind::Bool);
        assert_eq!(kind(&["2010", "Pop"]), ColumnKind::Text);
        assert_eq!(kind(&["", ""]), ColumnKind::Text);
    }

    #[test]
    fn column_kind_keeps_text_that_would_not_render_back() {
        assert_eq!(kind(&["007", "12"]), ColumnKind::Text);
        assert_eq!(kind(&["1.50", "2.5"]), ColumnKind::Text);
        assert_eq!(kind(&["Infinity"]), ColumnKind::Text);
        assert_eq!(kind(&["NaN", "1.5"]), ColumnKind::Text);
        assert_eq!(kind(&["2010.0", "1999.0"]), ColumnKind::Text);
    }

    #[test]
    fn song_text_columns_are_never_typed() {
        let values = ["311", "1999"];
        assert_eq!(ColumnKind::for_column(ARTIST_NAME, values.iter().copied()), ColumnKind::Text);
        assert_eq!(ColumnKind::for_column(YEAR, values.iter().copied()), ColumnKind::Integer);
    }

    #[test]
    fn parse_follows_column_kind() {
        assert_eq!(ColumnKind::Integer.parse(""), CellValue::Null);
        assert_eq!(ColumnKind::Integer.parse("2010"), CellValue::Integer(2010));
        assert_eq!(ColumnKind::Float.parse("0.5"), CellValue::Float(0.5));
        assert_eq!(ColumnKind::Bool.parse("true"), CellValue::Bool(true));
        assert_eq!(ColumnKind::Text.parse("007"), CellValue::String("007".into()));
    }

    #[test]
    fn year_reads_numeric_text() {
        let mut cells = Song::new(1, "A", "T", "x", 2000, "Pop").cells;
        cells.insert(YEAR.into(), CellValue::String("2010.0".into()));
        assert_eq!(Song::from_cells(cells).year, Some(2010));
    }

    #[test]
    fn year_tolerates_floats_and_garbage() {
        let mut cells = Song::new(1, "A", "T", "x", 2000, "Pop").cells;
        cells.insert(YEAR.into(), CellValue::Float(2010.0));
        assert_eq!(Song::from_cells(cells.clone()).year, Some(2010));

        cells.insert(YEAR.into(), CellValue::String("unknown".into()));
        let song = Song::from_cells(cells);
        assert_eq!(song.year, None);
        assert_eq!(song.cell(YEAR).to_string(), "unknown");
    }

    #[test]
    fn numeric_artist_is_still_text() {
        let mut cells = Song::new(1, "A", "T", "x", 2000, "Pop").cells;
        cells.insert(ARTIST_NAME.into(), CellValue::Integer(311));
        assert_eq!(Song::from_cells(cells).artist_name.as_deref(), Some("311"));
    }

    #[test]
    fn bounds_and_genres_skip_nulls() {
        let mut cells = Song::new(3, "C", "Z", "z", 0, "Jazz").cells;
        cells.insert(YEAR.into(), CellValue::Null);
        cells.insert(GENRE.into(), CellValue::Null);
        let ds = Dataset::from_songs(vec![
            Song::new(1, "A", "X", "x", 2005, "Rock"),
            Song::new(2, "B", "Y", "y", 1999, "Pop"),
            Song::from_cells(cells),
        ]);
        assert_eq!(ds.year_bounds(), Some((1999, 2005)));
        assert_eq!(
            ds.genres().into_iter().collect::<Vec<_>>(),
            vec!["Pop".to_string(), "Rock".to_string()]
        );
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        assert_eq!(Dataset::empty().year_bounds(), None);
        assert!(Dataset::empty().genres().is_empty());
    }
}
