//! `tabrecon-recon`: dataset comparison and validated merge.
//!
//! Pure engine crate: receives fully loaded datasets, returns reports and
//! merge results. No CLI or IO dependencies.

pub mod cells;
pub mod config;
pub mod error;
pub mod index;
pub mod merge;
pub mod model;
pub mod report;
pub mod rows;
pub mod stats;
pub mod structure;
pub mod suggest;
pub mod validate;

pub use config::{MergeConfig, ReconConfig, Tolerance};
pub use error::{ErrorKind, ReconError};
pub use merge::{concat, merge, KeySpec, MergeOptions};
pub use model::{
    CellReport, ComparisonReport, Finding, JoinKind, MergeResult, MergeSummary, MergeType, RowReport, Severity,
    StatsReport, StructureReport,
};
pub use report::compare_all;
pub use suggest::{suggest_join_keys, KeySuggestion};
