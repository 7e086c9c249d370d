/// Data layer: core types, loading/cleaning, and filtering.
///
/// Architecture:
/// ```text
///  table.csv / .tsv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows, coerce cells → HousingDataset
///   └──────────┘      (structured cells via `literal`)
///        │
///        ▼
///   ┌────────────────┐
///   │ HousingDataset  │  Vec<PropertyRecord>, type index, stats
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  type whitelist + numeric ranges → FilteredView
///   └──────────┘
/// ```

pub mod filter;
pub mod literal;
pub mod loader;
pub mod model;
