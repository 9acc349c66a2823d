//! Per-day exercise log.
//!
//! Maps each calendar day to the entries logged on it. A day with no
//! entries is never kept in the map, and an entry with no sets is removed
//! together with its last set.

use crate::types::{DateKey, ExerciseEntry, ExerciseSet};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered mapping of date key to the entries logged that day
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayLog {
    days: BTreeMap<DateKey, Vec<ExerciseEntry>>,
}

impl DayLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new entry to a day, creating the day if needed
    pub fn push_entry(&mut self, date: DateKey, entry: ExerciseEntry) {
        tracing::debug!("Logging '{}' ({}) on {}", entry.name, entry.id, date);
        self.days.entry(date).or_default().push(entry);
    }

    /// Append sets to an existing entry and refresh its timestamp
    pub fn append_sets(
        &mut self,
        date: DateKey,
        entry_id: &str,
        sets: &[ExerciseSet],
        now: DateTime<Utc>,
    ) -> Result<()> {
        let entry = self.find_mut(date, entry_id)?;
        entry.sets.extend_from_slice(sets);
        entry.logged_at = now;
        tracing::debug!(
            "Appended {} sets to '{}' ({}) on {}",
            sets.len(),
            entry.name,
            entry_id,
            date
        );
        Ok(())
    }

    /// Remove one set; removes the entry and then the day once they are empty
    pub fn delete_set(&mut self, date: DateKey, entry_id: &str, set_index: usize) -> Result<()> {
        let entry = self.find_mut(date, entry_id)?;
        if set_index >= entry.sets.len() {
            return Err(Error::invalid(format!(
                "set index {} out of range for '{}' ({} sets)",
                set_index,
                entry.name,
                entry.sets.len()
            )));
        }

        entry.sets.remove(set_index);
        if entry.sets.is_empty() {
            tracing::debug!("Last set removed, deleting entry {}", entry_id);
            return self.delete_entry(date, entry_id);
        }
        Ok(())
    }

    /// Remove an entry; removes the day once it has no entries left
    pub fn delete_entry(&mut self, date: DateKey, entry_id: &str) -> Result<()> {
        let entries = self
            .days
            .get_mut(&date)
            .ok_or_else(|| Error::invalid(format!("no exercises logged on {}", date)))?;

        let before = entries.len();
        entries.retain(|e| e.id != entry_id);
        if entries.len() == before {
            return Err(Error::invalid(format!(
                "no exercise with id '{}' on {}",
                entry_id, date
            )));
        }

        if entries.is_empty() {
            self.days.remove(&date);
            tracing::debug!("Removed empty day {}", date);
        }
        Ok(())
    }

    pub fn find(&self, date: DateKey, entry_id: &str) -> Option<&ExerciseEntry> {
        self.days
            .get(&date)
            .and_then(|entries| entries.iter().find(|e| e.id == entry_id))
    }

    fn find_mut(&mut self, date: DateKey, entry_id: &str) -> Result<&mut ExerciseEntry> {
        self.days
            .get_mut(&date)
            .and_then(|entries| entries.iter_mut().find(|e| e.id == entry_id))
            .ok_or_else(|| {
                Error::invalid(format!("no exercise with id '{}' on {}", entry_id, date))
            })
    }

    /// Entries for a day, newest first
    pub fn list_for_date(&self, date: DateKey) -> Vec<ExerciseEntry> {
        let mut entries = self.days.get(&date).cloned().unwrap_or_default();
        entries.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        entries
    }

    /// All entries from `start` through `end`, both inclusive
    ///
    /// Uses an ordered range query, so the cost depends on the days that
    /// actually have entries in the range rather than the total history.
    pub fn entries_in_range(&self, start: DateKey, end: DateKey) -> Vec<ExerciseEntry> {
        if start > end {
            return Vec::new();
        }
        self.days
            .range(start..=end)
            .flat_map(|(_, entries)| entries.iter().cloned())
            .collect()
    }

    pub fn contains_date(&self, date: DateKey) -> bool {
        self.days.contains_key(&date)
    }

    /// Days that have at least one entry, oldest first
    pub fn dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.days.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Drop entries without sets and days without entries.
    ///
    /// Returns the number of entries removed.
    pub(crate) fn prune_empty(&mut self) -> usize {
        let mut removed = 0;
        for entries in self.days.values_mut() {
            let before = entries.len();
            entries.retain(|e| !e.sets.is_empty());
            removed += before - entries.len();
        }
        self.days.retain(|_, entries| !entries.is_empty());
        removed
    }
}
