/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ProductDataset
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ ProductDataset │  Vec<Product>, distinct categories / brands
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category / price band predicates → kept rows
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
