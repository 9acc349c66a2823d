//! In-progress exercise sessions.
//!
//! A draft accumulates sets before they are written into the day log. It is
//! either seeded from an exercise type (creating a new entry on commit) or
//! from an already logged entry (appending to it on commit).

use crate::types::{ExerciseEntry, ExerciseSet, ExerciseType};
use crate::Result;
use std::collections::BTreeSet;

/// Uncommitted sets for one exercise
#[derive(Clone, Debug, PartialEq)]
pub struct SessionDraft {
    pub name: String,
    pub rep_unit: String,
    pub body_parts: BTreeSet<String>,
    pub(crate) sets: Vec<ExerciseSet>,
    /// Set when the draft adds sets to an entry that is already logged
    pub existing_entry_id: Option<String>,
}

impl SessionDraft {
    /// Start a draft for a new entry of the given exercise type
    pub fn from_type(exercise_type: &ExerciseType) -> Self {
        Self {
            name: exercise_type.display_name.clone(),
            rep_unit: exercise_type.rep_unit.clone(),
            body_parts: exercise_type.body_parts.clone(),
            sets: Vec::new(),
            existing_entry_id: None,
        }
    }

    /// Start a draft that appends sets to a logged entry
    pub fn for_entry(entry: &ExerciseEntry) -> Self {
        Self {
            name: entry.name.clone(),
            rep_unit: entry.rep_unit.clone(),
            body_parts: entry.body_parts.clone(),
            sets: Vec::new(),
            existing_entry_id: Some(entry.id.clone()),
        }
    }

    /// Append a set. Reps must be positive; weight, if given, non-negative.
    pub fn add_set(&mut self, reps: f64, weight: Option<f64>) -> Result<()> {
        let set = ExerciseSet::new(reps, weight)?;
        self.sets.push(set);
        Ok(())
    }

    /// Sets added so far, in order
    pub fn sets(&self) -> &[ExerciseSet] {
        &self.sets
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
