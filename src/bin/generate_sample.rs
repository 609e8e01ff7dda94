use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use song_search::data::export;
use song_search::data::model::{CellValue, Dataset, Song};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

const BASE62: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Spotify-style 22 character track id.
fn track_id(rng: &mut SimpleRng) -> String {
    (0..22)
        .map(|_| BASE62[rng.below(BASE62.len())] as char)
        .collect()
}

fn generate(n: usize, rng: &mut SimpleRng) -> Vec<Song> {
    let artists = [
        "Coldplay", "Radiohead", "Daft Punk", "Miles Davis", "Björk", "Kendrick Lamar",
        "Taylor Swift", "Metallica", "Nina Simone", "The Weeknd", "Aphex Twin", "Adele",
    ];
    let words = [
        "Yellow", "Night", "Echo", "Paper", "River", "Golden", "Static", "Blue", "Fire",
        "Midnight", "Glass", "Heart", "Signal", "Dream",
    ];
    let genres = [
        "pop", "rock", "electronic", "jazz", "hip-hop", "metal", "soul", "indie",
    ];

    (0..n)
        .map(|i| {
            let title = format!("{} {}", rng.pick(&words), rng.pick(&words));
            let year = 2000 + rng.below(24) as i64;
            let mut song = Song::new(
                i as i64,
                rng.pick(&artists),
                &title,
                &track_id(rng),
                year,
                rng.pick(&genres),
            );
            song.cells
                .insert("popularity".into(), CellValue::Integer(rng.below(101) as i64));
            song
        })
        .collect()
}

fn write_parquet(path: &Path, dataset: &Dataset) -> Result<()> {
    let text = |col: &str| -> ArrayRef {
        Arc::new(StringArray::from(
            dataset
                .songs
                .iter()
                .map(|s| s.cell(col).as_text())
                .collect::<Vec<_>>(),
        ))
    };
    let int = |col: &str| -> ArrayRef {
        Arc::new(Int64Array::from(
            dataset
                .songs
                .iter()
                .map(|s| s.cell(col).as_i64())
                .collect::<Vec<_>>(),
        ))
    };

    let mut fields = Vec::new();
    let mut arrays = Vec::new();
    for col in &dataset.columns {
        let is_int = matches!(col.as_str(), "id" | "year" | "popularity");
        let dtype = if is_int { DataType::Int64 } else { DataType::Utf8 };
        fields.push(Field::new(col, dtype, true));
        arrays.push(if is_int { int(col.as_str()) } else { text(col.as_str()) });
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = PathBuf::from(
        args.next()
            .unwrap_or_else(|| "updated_spotify_data.csv".to_string()),
    );
    let count: usize = match args.next() {
        Some(n) => n.parse().context("row count must be a number")?,
        None => 500,
    };

    let mut rng = SimpleRng::new(42);
    let songs = generate(count, &mut rng);

    let columns: Vec<String> = [
        "id", "artist_name", "track_name", "track_id", "popularity", "year", "genre",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    let dataset = Dataset::new(columns, songs);

    let is_parquet = output_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&output_path, &dataset)?;
    } else {
        let all: Vec<usize> = (0..dataset.len()).collect();
        export::write_csv(&output_path, &dataset, &all)?;
    }

    let genres: BTreeMap<&str, usize> = dataset
        .songs
        .iter()
        .filter_map(|s| s.genre.as_deref())
        .fold(BTreeMap::new(), |mut acc, g| {
            *acc.entry(g).or_default() += 1;
            acc
        });
    println!(
        "Wrote {} songs to {} ({genres:?})",
        dataset.len(),
        output_path.display()
    );
    Ok(())
}
