//! Catalogue aggregation for MultiNest spectral-fit results.
//!
//! Per-object statistics files are parsed into a [`Catalogue`] of objects
//! and posterior modes, which can be saved, reloaded and aligned against an
//! observed catalogue with [`match_ids`].

pub mod config;
pub mod data;
pub mod error;
pub mod matcher;

pub use config::ResultsLayout;
pub use data::export::export_csv;
pub use data::layout::render_stats;
pub use data::loader::{
    build_catalogue, parse_stats_file, BuildReport, CatalogueBuilder, FailurePolicy,
    ModeCountPolicy, ParseOptions, SkippedFile,
};
pub use data::model::{Catalogue, ModeRecord, ObjectRecord};
pub use data::params::{ParamInfo, ParamSpec};
pub use data::store::{load, load_expecting, save};
pub use error::{CatalogueError, Result};
pub use matcher::match_ids;
