/// Data layer: core types, loading, filtering, statistics and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (or LoadError)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Song>, source column order
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  filter   │   │  stats    │  summary metrics
///   └──────────┘   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  matching rows → CSV
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
