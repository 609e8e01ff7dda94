use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, ColumnKind, Dataset, REQUIRED_COLUMNS, Song};

// ---------------------------------------------------------------------------
// Errors surfaced to the user
// ---------------------------------------------------------------------------

/// Recoverable load failures. The session keeps an empty dataset and shows
/// the message instead of aborting.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File '{}' not found. Please make sure your data file exists.", .0.display())]
    DataSourceNotFound(PathBuf),

    #[error("Data file is missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Read(#[from] anyhow::Error),
}

impl LoadError {
    /// Message for the status area, with the full cause chain for read errors.
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Read(e) => format!("Error: {e:#}"),
            other => other.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a song dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one song per line (the default source)
/// * `.json`    – `[{ "artist_name": "...", "year": 2010, ... }, ...]`
/// * `.parquet` – flat columns, as written by Pandas or Polars
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::DataSourceNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    check_required_columns(&dataset.columns)?;
    Ok(dataset)
}

fn check_required_columns(columns: &[String]) -> Result<(), LoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|req| !columns.iter().any(|c| c == *req))
        .map(|req| req.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoadError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one song per record.
///
/// Records are read in full first so each column gets a single type, see
/// [`ColumnKind`].
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let records: Vec<csv::StringRecord> = reader
        .records()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect::<Result<_>>()?;

    let kinds: Vec<ColumnKind> = headers
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            ColumnKind::for_column(col, records.iter().map(move |r| r.get(idx).unwrap_or("")))
        })
        .collect();

    let songs = records
        .iter()
        .map(|record| {
            let cells: BTreeMap<String, CellValue> = headers
                .iter()
                .zip(&kinds)
                .zip(record.iter())
                .map(|((col, kind), value)| (col.clone(), kind.parse(value)))
                .collect();
            Song::from_cells(cells)
        })
        .collect();

    Ok(Dataset::new(headers, songs))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "id": 0, "artist_name": "Abc", "track_name": "X", "year": 2000, ... },
///   ...
/// ]
/// ```
///
/// Column order is the order keys are first seen.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut songs = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut cells = BTreeMap::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            cells.insert(key.clone(), json_to_cell(val));
        }

        songs.push(Song::from_cells(cells));
    }

    Ok(Dataset::new(columns, songs))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per song field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut songs = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                cells.insert(col_name.clone(), value);
            }
            songs.push(Song::from_cells(cells));
        }
    }

    Ok(Dataset::new(columns, songs))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64)
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(..) => {
            bail!("nested column type {:?} is not supported", col.data_type())
        }
        _ => CellValue::String(array_value_to_string(col.as_ref(), row)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::tempdir;

    const CSV: &str = "\
id,artist_name,track_name,track_id,popularity,year,genre
0,Abc,X,t0,55,2000,Pop
1,Xyz,Y,t1,,2010,Rock
";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_is_data_source_not_found() {
        let tmp = tempdir().unwrap();
        let err = load_file(&tmp.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::DataSourceNotFound(_)));
        assert!(err.user_message().contains("nope.csv"));
    }

    #[test]
    fn csv_keeps_column_order_and_extra_columns() {
        let tmp = tempdir().unwrap();
        let ds = load_file(&write(tmp.path(), "songs.csv", CSV)).unwrap();

        assert_eq!(
            ds.columns,
            vec!["id", "artist_name", "track_name", "track_id", "popularity", "year", "genre"]
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.songs[0].artist_name.as_deref(), Some("Abc"));
        assert_eq!(ds.songs[0].year, Some(2000));
        assert_eq!(ds.songs[0].cell("popularity"), &CellValue::Integer(55));
        assert_eq!(ds.songs[1].cell("popularity"), &CellValue::Null);
        assert_eq!(ds.songs[1].genre.as_deref(), Some("Rock"));
    }

    #[test]
    fn text_that_looks_numeric_is_kept_as_written() {
        let tmp = tempdir().unwrap();
        let csv = "\
id,artist_name,track_name,track_id,year,genre,tempo
0,Nena,Infinity,0042,1983,Pop,1.50
1,Guru,007,t1,1995,Hip-Hop,98
2,Blink,1.50,t2,1999,Rock,
3,311,NaN,t3,1995,Rock,120.0
";
        let ds = load_file(&write(tmp.path(), "songs.csv", csv)).unwrap();

        let tracks: Vec<_> = ds.songs.iter().map(|s| s.track_name.as_deref()).collect();
        assert_eq!(tracks, vec![Some("Infinity"), Some("007"), Some("1.50"), Some("NaN")]);
        assert_eq!(ds.songs[0].track_id.as_deref(), Some("0042"));
        assert_eq!(ds.songs[3].artist_name.as_deref(), Some("311"));
        assert_eq!(ds.songs[0].cell("tempo"), &CellValue::String("1.50".into()));
        assert_eq!(ds.songs[2].cell("tempo"), &CellValue::Null);
        assert_eq!(ds.songs[1].year, Some(1995));
        assert_eq!(ds.songs[1].cell("id"), &CellValue::Integer(1));
    }

    #[test]
    fn float_year_column_still_yields_years() {
        let tmp = tempdir().unwrap();
        let csv = "id,artist_name,track_name,track_id,year,genre\n0,A,X,t0,2010.0,Pop\n1,B,Y,t1,,Rock\n";
        let ds = load_file(&write(tmp.path(), "songs.csv", csv)).unwrap();
        assert_eq!(ds.songs[0].year, Some(2010));
        assert_eq!(ds.songs[0].cell("year").to_string(), "2010.0");
        assert_eq!(ds.songs[1].year, None);
    }

    #[test]
    fn header_only_csv_loads_empty() {
        let tmp = tempdir().unwrap();
        let header = "id,artist_name,track_name,track_id,year,genre\n";
        let ds = load_file(&write(tmp.path(), "songs.csv", header)).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn missing_required_columns_are_reported() {
        let tmp = tempdir().unwrap();
        let path = write(tmp.path(), "songs.csv", "id,artist_name,track_name\n0,A,B\n");
        match load_file(&path).unwrap_err() {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["track_id", "year", "genre"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unsupported_extension_is_a_read_error() {
        let tmp = tempdir().unwrap();
        let err = load_file(&write(tmp.path(), "songs.txt", CSV)).unwrap_err();
        assert!(matches!(err, LoadError::Read(_)));
        assert!(err.user_message().contains("Unsupported file extension"));
    }

    #[test]
    fn json_records_load() {
        let tmp = tempdir().unwrap();
        let json = r#"[
            {"id": 0, "artist_name": "Abc", "track_name": "X", "track_id": "t0", "year": 2000, "genre": "Pop"},
            {"id": 1, "artist_name": null, "track_name": "Y", "track_id": "t1", "year": 2010.0, "genre": "Rock"}
        ]"#;
        let ds = load_file(&write(tmp.path(), "songs.json", json)).unwrap();

        assert_eq!(ds.columns[0], "id");
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.songs[1].artist_name, None);
        assert_eq!(ds.songs[1].year, Some(2010));
    }

    #[test]
    fn parquet_columns_load() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("songs.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("artist_name", DataType::Utf8, true),
            Field::new("track_name", DataType::Utf8, false),
            Field::new("track_id", DataType::Utf8, false),
            Field::new("year", DataType::Int64, false),
            Field::new("genre", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![0, 1])),
                Arc::new(StringArray::from(vec![Some("Abc"), None])),
                Arc::new(StringArray::from(vec!["X", "Y"])),
                Arc::new(StringArray::from(vec!["t0", "t1"])),
                Arc::new(Int64Array::from(vec![2000, 2010])),
                Arc::new(StringArray::from(vec!["Pop", "Rock"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(
            ds.columns,
            vec!["id", "artist_name", "track_name", "track_id", "year", "genre"]
        );
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.songs[0].artist_name.as_deref(), Some("Abc"));
        assert_eq!(ds.songs[1].artist_name, None);
        assert_eq!(ds.songs[1].year, Some(2010));
    }
}
