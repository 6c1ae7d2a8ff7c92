/// Data layer: catalogue types, statistics-file parsing, persistence.
///
/// Architecture:
/// ```text
///  <id>_BANGS_MNstats.dat  (one per object)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fixed-offset scan (layout) → ObjectRecord
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ Catalogue  │  Vec<ObjectRecord>, each Vec<ModeRecord>
///   └───────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  store    │   │  export   │  JSON blob / flat CSV table
///   └──────────┘   └──────────┘
/// ```

pub mod export;
pub mod layout;
pub mod loader;
pub mod model;
pub mod params;
pub mod store;
