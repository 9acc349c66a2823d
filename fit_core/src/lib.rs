#![forbid(unsafe_code)]

//! Core domain model and business logic for the Fit Tracker system.
//!
//! This crate provides:
//! - Domain types (exercise types, sets, logged entries, date keys)
//! - Exercise catalog with normalized-name lookup
//! - Day log store and session drafts
//! - Statistics aggregation over date ranges
//! - Persistence (JSON state files) and backup export/import

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod daylog;
pub mod draft;
pub mod stats;
pub mod persistence;
pub mod backup;
pub mod tracker;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{normalize_name, ExerciseCatalog};
pub use config::Config;
pub use daylog::DayLog;
pub use draft::SessionDraft;
pub use stats::{summarize, ChartPoint, ChartSeries, StatisticsSummary};
pub use persistence::{JsonFileStore, MemoryStore, StateStore, TrackerState};
pub use backup::{backup_filename, ExportSnapshot, EXPORT_VERSION};
pub use tracker::Tracker;
