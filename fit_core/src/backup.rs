//! Backup export and import.
//!
//! A backup is a versioned JSON snapshot of both persisted records. Import
//! validates and decodes the whole document before anything is replaced.

use crate::catalog::ExerciseCatalog;
use crate::daylog::DayLog;
use crate::persistence::TrackerState;
use crate::types::DateKey;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EXPORT_VERSION: &str = "1.0";

/// Versioned snapshot written by export and read by import
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub version: String,
    #[serde(alias = "exportDate")]
    pub exported_at: DateTime<Utc>,
    pub exercises: DayLog,
    pub exercise_types: ExerciseCatalog,
}

impl ExportSnapshot {
    pub fn new(state: &TrackerState, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION.to_string(),
            exported_at,
            exercises: state.log.clone(),
            exercise_types: state.catalog.clone(),
        }
    }

    /// Pretty-printed JSON document for download
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Conventional backup file name for the given day
pub fn backup_filename(date: DateKey) -> String {
    format!("fit-tracker-backup-{}.json", date)
}

/// Parse an import document into the state it would install.
///
/// Only the presence of `exercises` and `exerciseTypes` is required; the
/// version and export time are informational. Nothing is mutated here.
pub fn parse_import(document: &str) -> Result<TrackerState> {
    let value: serde_json::Value = serde_json::from_str(document)
        .map_err(|e| Error::MalformedImport(format!("not valid JSON: {}", e)))?;

    let object = value
        .as_object()
        .ok_or_else(|| Error::MalformedImport("backup must be a JSON object".into()))?;

    let field = |key: &str| {
        object
            .get(key)
            .filter(|v| !v.is_null())
            .cloned()
            .ok_or_else(|| Error::MalformedImport(format!("missing required key '{}'", key)))
    };
    let exercises = field("exercises")?;
    let exercise_types = field("exerciseTypes")?;

    let mut log: DayLog = serde_json::from_value(exercises)
        .map_err(|e| Error::MalformedImport(format!("invalid exercises: {}", e)))?;
    let catalog: ExerciseCatalog = serde_json::from_value(exercise_types)
        .map_err(|e| Error::MalformedImport(format!("invalid exerciseTypes: {}", e)))?;

    let pruned = log.prune_empty();
    if pruned > 0 {
        tracing::warn!("Dropped {} imported exercises without sets", pruned);
    }

    if let Some(version) = object.get("version").and_then(|v| v.as_str()) {
        tracing::debug!("Importing backup version {}", version);
    }

    Ok(TrackerState {
        catalog: catalog.normalized(),
        log,
    })
}
