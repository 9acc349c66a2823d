//! Core domain types for the Fit Tracker system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise type definitions kept in the catalog
//! - Sets and logged exercise entries
//! - Calendar date keys used to index the day log

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Exercise Types
// ============================================================================

/// A registered exercise definition (e.g., "Bench Press")
///
/// Created once per normalized name and never updated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseType {
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "repType")]
    pub rep_unit: String,
    #[serde(default)]
    pub body_parts: BTreeSet<String>,
}

// ============================================================================
// Sets and Entries
// ============================================================================

/// One set of an exercise. `weight` of `None` means bodyweight.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    pub reps: f64,
    #[serde(default)]
    pub weight: Option<f64>,
}

impl ExerciseSet {
    /// Build a set, rejecting non-positive reps and negative weight
    pub fn new(reps: f64, weight: Option<f64>) -> crate::Result<Self> {
        if !reps.is_finite() || reps <= 0.0 {
            return Err(crate::Error::invalid(format!(
                "reps must be a positive number, got {}",
                reps
            )));
        }
        if let Some(w) = weight {
            if !w.is_finite() || w < 0.0 {
                return Err(crate::Error::invalid(format!(
                    "weight must be zero or more, got {}",
                    w
                )));
            }
        }
        Ok(Self { reps, weight })
    }

    /// Weight moved by this set (`weight * reps`, bodyweight counts as 0)
    pub fn volume(&self) -> f64 {
        self.weight.map(|w| w * self.reps).unwrap_or(0.0)
    }
}

/// An exercise logged on a particular day
///
/// `name`, `rep_unit` and `body_parts` are a snapshot of the exercise type
/// taken when the entry was created.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub id: String,
    pub name: String,
    #[serde(alias = "repType")]
    pub rep_unit: String,
    #[serde(default)]
    pub body_parts: BTreeSet<String>,
    pub sets: Vec<ExerciseSet>,
    #[serde(alias = "timestamp")]
    pub logged_at: DateTime<Utc>,
}

impl ExerciseEntry {
    pub fn set_count(&self) -> usize {
        self.sets.len()
    }

    /// Sum of reps across all sets
    pub fn total_reps(&self) -> f64 {
        self.sets.iter().map(|s| s.reps).sum()
    }

    /// Sum of `weight * reps` across all weighted sets
    pub fn total_weight(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::volume).sum()
    }
}

// ============================================================================
// Date Keys
// ============================================================================

/// Calendar day in the local timezone, rendered as `YYYY-MM-DD`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a key from year/month/day, if the date exists
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Today's date in the local timezone
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The following calendar day
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding calendar day
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        let key = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self)
            .map_err(|e| crate::Error::invalid(format!("invalid date key '{}': {}", s, e)))?;
        // Only the canonical zero-padded form is a valid key.
        if key.to_string() != s {
            return Err(crate::Error::invalid(format!(
                "date key must be YYYY-MM-DD, got '{}'",
                s
            )));
        }
        Ok(key)
    }
}

impl TryFrom<String> for DateKey {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        s.parse()
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.to_string()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rejects_bad_reps() {
        assert!(ExerciseSet::new(0.0, None).is_err());
        assert!(ExerciseSet::new(-3.0, Some(10.0)).is_err());
        assert!(ExerciseSet::new(f64::NAN, None).is_err());
        assert!(ExerciseSet::new(5.0, Some(-1.0)).is_err());
        assert!(ExerciseSet::new(5.0, Some(0.0)).is_ok());
        assert!(ExerciseSet::new(2.5, None).is_ok());
    }

    #[test]
    fn test_set_volume() {
        let weighted = ExerciseSet::new(5.0, Some(135.0)).unwrap();
        let bodyweight = ExerciseSet::new(12.0, None).unwrap();
        assert_eq!(weighted.volume(), 675.0);
        assert_eq!(bodyweight.volume(), 0.0);
    }

    #[test]
    fn test_date_key_display_is_zero_padded() {
        let key = DateKey::from_ymd(2024, 3, 7).unwrap();
        assert_eq!(key.to_string(), "2024-03-07");
    }

    #[test]
    fn test_date_key_parse() {
        let key: DateKey = "2024-12-31".parse().unwrap();
        assert_eq!(key.succ().unwrap().to_string(), "2025-01-01");
        assert_eq!(key.pred().unwrap().to_string(), "2024-12-30");

        assert!("2024-1-5".parse::<DateKey>().is_err());
        assert!("02024-1-01".parse::<DateKey>().is_err());
        assert!("2024-1-015".parse::<DateKey>().is_err());
        assert!("2024-02-30".parse::<DateKey>().is_err());
        assert!("yesterday".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_entry_serializes_with_persisted_field_names() {
        let entry = ExerciseEntry {
            id: "1".into(),
            name: "Pull-up".into(),
            rep_unit: "reps".into(),
            body_parts: ["back".to_string()].into_iter().collect(),
            sets: vec![ExerciseSet::new(8.0, None).unwrap()],
            logged_at: Utc::now(),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("repUnit").is_some());
        assert!(value.get("bodyParts").is_some());
        assert!(value.get("loggedAt").is_some());
        assert!(value["sets"][0]["weight"].is_null());
    }

    #[test]
    fn test_entry_accepts_browser_storage_field_names() {
        let json = r#"{
            "id": "1712345678901",
            "name": "Squat",
            "repType": "reps",
            "bodyParts": ["legs", "glutes"],
            "sets": [{"reps": 5, "weight": 225}, {"reps": 5, "weight": null}],
            "timestamp": "2024-04-05T18:30:00.000Z"
        }"#;

        let entry: ExerciseEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.rep_unit, "reps");
        assert_eq!(entry.sets.len(), 2);
        assert_eq!(entry.sets[0].weight, Some(225.0));
        assert_eq!(entry.sets[1].weight, None);
        assert_eq!(entry.total_reps(), 10.0);
        assert_eq!(entry.total_weight(), 1125.0);
    }
}
