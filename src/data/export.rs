use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Write the rows at `indices` as CSV: header row first, columns in source
/// order, no index column.
pub fn write_rows<W: Write>(writer: W, dataset: &Dataset, indices: &[usize]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&dataset.columns)
        .context("writing CSV header")?;

    for &i in indices {
        let song = &dataset.songs[i];
        let record: Vec<String> = dataset
            .columns
            .iter()
            .map(|col| song.cell(col).to_string())
            .collect();
        wtr.write_record(&record)
            .with_context(|| format!("writing CSV row {i}"))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// CSV encoding of the selected rows, ready to hand to a download action.
pub fn to_csv_bytes(dataset: &Dataset, indices: &[usize]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_rows(&mut buf, dataset, indices)?;
    Ok(buf)
}

/// Export the selected rows to `path`.
pub fn write_csv(path: &Path, dataset: &Dataset, indices: &[usize]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_rows(std::io::BufWriter::new(file), dataset, indices)
        .with_context(|| format!("exporting to {}", path.display()))
}
