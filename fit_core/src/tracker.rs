//! The tracker store: catalog and day log behind a persistence backend.
//!
//! Every mutating operation is staged on a copy of the state, saved through
//! the backend, and only then swapped in. A failed save leaves the
//! in-memory state exactly as it was before the call.

use crate::backup::{self, ExportSnapshot};
use crate::draft::SessionDraft;
use crate::persistence::{StateStore, TrackerState};
use crate::stats::{summarize, StatisticsSummary};
use crate::types::{DateKey, ExerciseEntry, ExerciseSet, ExerciseType};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Explicitly constructed fitness log with load-at-startup and
/// persist-after-mutation lifecycle
pub struct Tracker<S: StateStore> {
    state: TrackerState,
    store: S,
}

impl<S: StateStore> Tracker<S> {
    /// Load state from the store
    pub fn open(store: S) -> Result<Self> {
        let state = store.load()?;
        tracing::info!(
            "Opened tracker with {} exercise types",
            state.catalog.len()
        );
        Ok(Self { state, store })
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stage a change, persist it, then make it visible
    fn mutate<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut TrackerState) -> Result<T>,
    {
        let mut staged = self.state.clone();
        let out = f(&mut staged)?;
        self.store.save(&staged)?;
        self.state = staged;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Exercise catalog
    // ------------------------------------------------------------------

    /// Register an exercise type unless the name is already known.
    ///
    /// First registration wins: for a known name the stored type is returned
    /// and `rep_unit`/`body_parts` are ignored. Nothing is written then.
    pub fn register_if_absent<I, T>(
        &mut self,
        name: &str,
        rep_unit: &str,
        body_parts: I,
    ) -> Result<ExerciseType>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if let Some(existing) = self.state.catalog.lookup(name) {
            return Ok(existing.clone());
        }
        if name.trim().is_empty() {
            return Err(Error::invalid("exercise name must not be empty"));
        }
        self.mutate(|state| Ok(state.catalog.register_if_absent(name, rep_unit, body_parts)))
    }

    pub fn lookup(&self, name: &str) -> Option<&ExerciseType> {
        self.state.catalog.lookup(name)
    }

    /// Display names of all known exercises
    pub fn exercise_names(&self) -> Vec<String> {
        self.state.catalog.names()
    }

    /// Registered exercise types, ordered by normalized name
    pub fn exercise_types(&self) -> impl Iterator<Item = &ExerciseType> {
        self.state.catalog.iter()
    }

    // ------------------------------------------------------------------
    // Sessions
    // ------------------------------------------------------------------

    /// Start a draft for a new entry, registering the exercise if it's new
    pub fn start_session<I, T>(
        &mut self,
        name: &str,
        rep_unit: &str,
        body_parts: I,
    ) -> Result<SessionDraft>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let exercise_type = self.register_if_absent(name, rep_unit, body_parts)?;
        Ok(SessionDraft::from_type(&exercise_type))
    }

    /// Start a draft that adds sets to an entry already logged on `date`
    pub fn start_session_for_entry(&self, date: DateKey, entry_id: &str) -> Result<SessionDraft> {
        self.state
            .log
            .find(date, entry_id)
            .map(SessionDraft::for_entry)
            .ok_or_else(|| Error::invalid(format!("no exercise with id '{}' on {}", entry_id, date)))
    }

    /// Append a set to a draft, returning the updated draft
    pub fn add_set_to_draft(
        &self,
        mut draft: SessionDraft,
        reps: f64,
        weight: Option<f64>,
    ) -> Result<SessionDraft> {
        draft.add_set(reps, weight)?;
        Ok(draft)
    }

    /// Write a draft into the day log using the current time
    pub fn commit(&mut self, draft: SessionDraft, date: DateKey) -> Result<String> {
        self.commit_at(draft, date, Utc::now())
    }

    /// Write a draft into the day log.
    ///
    /// Returns the id of the created or extended entry.
    pub fn commit_at(
        &mut self,
        draft: SessionDraft,
        date: DateKey,
        now: DateTime<Utc>,
    ) -> Result<String> {
        if draft.is_empty() {
            return Err(Error::invalid("cannot commit an exercise without sets"));
        }
        for set in draft.sets() {
            ExerciseSet::new(set.reps, set.weight)?;
        }

        self.mutate(|state| match draft.existing_entry_id {
            Some(id) => {
                state.log.append_sets(date, &id, &draft.sets, now)?;
                Ok(id)
            }
            None => {
                let id = new_entry_id(now);
                state.log.push_entry(
                    date,
                    ExerciseEntry {
                        id: id.clone(),
                        name: draft.name,
                        rep_unit: draft.rep_unit,
                        body_parts: draft.body_parts,
                        sets: draft.sets,
                        logged_at: now,
                    },
                );
                Ok(id)
            }
        })
    }

    // ------------------------------------------------------------------
    // Day log
    // ------------------------------------------------------------------

    /// Delete one set; empty entries and days are removed with it
    pub fn delete_set(&mut self, date: DateKey, entry_id: &str, set_index: usize) -> Result<()> {
        self.mutate(|state| state.log.delete_set(date, entry_id, set_index))
    }

    /// Delete an entry; an empty day is removed with it
    pub fn delete_exercise(&mut self, date: DateKey, entry_id: &str) -> Result<()> {
        self.mutate(|state| state.log.delete_entry(date, entry_id))
    }

    /// Entries logged on `date`, newest first
    pub fn list_for_date(&self, date: DateKey) -> Vec<ExerciseEntry> {
        self.state.log.list_for_date(date)
    }

    /// Entries from `start` through `end`, inclusive
    pub fn entries_in_range(&self, start: DateKey, end: DateKey) -> Vec<ExerciseEntry> {
        self.state.log.entries_in_range(start, end)
    }

    /// Statistics for every entry from `start` through `end`
    pub fn summarize_range(&self, start: DateKey, end: DateKey) -> StatisticsSummary {
        summarize(&self.entries_in_range(start, end))
    }

    // ------------------------------------------------------------------
    // Backup
    // ------------------------------------------------------------------

    pub fn export(&self) -> ExportSnapshot {
        self.export_at(Utc::now())
    }

    pub fn export_at(&self, exported_at: DateTime<Utc>) -> ExportSnapshot {
        ExportSnapshot::new(&self.state, exported_at)
    }

    /// Replace both records with the contents of a backup document.
    ///
    /// The document is fully decoded before anything changes; on any error
    /// the current state is kept.
    pub fn import(&mut self, document: &str) -> Result<()> {
        let imported = backup::parse_import(document)?;
        self.mutate(|state| {
            *state = imported;
            Ok(())
        })?;
        tracing::info!(
            "Imported backup with {} exercise types",
            self.state.catalog.len()
        );
        Ok(())
    }
}

/// Time-ordered unique id for a new entry
fn new_entry_id(now: DateTime<Utc>) -> String {
    let ts = uuid::Timestamp::from_unix(
        uuid::NoContext,
        now.timestamp() as u64,
        now.timestamp_subsec_nanos(),
    );
    Uuid::new_v7(ts).to_string()
}
