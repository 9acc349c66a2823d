//! Exercise catalog keyed by normalized exercise name.
//!
//! The catalog remembers the rep unit and body parts of every exercise the
//! user has logged so that recurring exercises can be filled in
//! automatically. Registration is idempotent: the first registration of a
//! name wins and later attempts return the stored type unchanged.

use crate::types::ExerciseType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Normalize an exercise name into its catalog key (trimmed, lower-cased)
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Registry of exercise types, serialized as a map of normalized name to type
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseCatalog {
    types: BTreeMap<String, ExerciseType>,
}

impl ExerciseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exercise type unless one already exists under the
    /// normalized name. Returns the stored type either way.
    ///
    /// `rep_unit` and `body_parts` are ignored when the name is already known.
    pub fn register_if_absent<I, S>(
        &mut self,
        name: &str,
        rep_unit: &str,
        body_parts: I,
    ) -> ExerciseType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = normalize_name(name);
        if let Some(existing) = self.types.get(&key) {
            tracing::debug!("Exercise type '{}' already registered", key);
            return existing.clone();
        }

        let body_parts: BTreeSet<String> = body_parts
            .into_iter()
            .map(|p| {
                let p: String = p.into();
                p.trim().to_string()
            })
            .filter(|p| !p.is_empty())
            .collect();

        let exercise_type = ExerciseType {
            display_name: name.trim().to_string(),
            rep_unit: rep_unit.trim().to_string(),
            body_parts,
        };
        tracing::debug!("Registered exercise type '{}'", key);
        self.types.insert(key, exercise_type.clone());
        exercise_type
    }

    /// Look up an exercise type by name, ignoring case and surrounding whitespace
    pub fn lookup(&self, name: &str) -> Option<&ExerciseType> {
        self.types.get(&normalize_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Display names of every registered exercise, for autocomplete lists
    pub fn names(&self) -> Vec<String> {
        // Keys are already lower-cased, so map order is case-insensitive order.
        self.types.values().map(|t| t.display_name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Re-key every type under its normalized name.
    ///
    /// Imported catalogs are trusted as-is, but lookups only work if keys are
    /// normalized. On a key collision the first entry in map order is kept.
    pub(crate) fn normalized(self) -> Self {
        let mut types = BTreeMap::new();
        for (key, exercise_type) in self.types {
            types.entry(normalize_name(&key)).or_insert(exercise_type);
        }
        Self { types }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Squat "), "squat");
        assert_eq!(normalize_name("Bench PRESS"), "bench press");
    }

    #[test]
    fn test_register_and_lookup_ignore_case_and_whitespace() {
        let mut catalog = ExerciseCatalog::new();
        let registered = catalog.register_if_absent("  Squat ", "reps", ["legs"]);
        assert_eq!(registered.display_name, "Squat");

        for query in ["squat", "SQUAT", "  sQuAt  "] {
            let found = catalog.lookup(query).expect("squat should resolve");
            assert_eq!(found, &registered);
        }
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut catalog = ExerciseCatalog::new();
        catalog.register_if_absent("Plank", "seconds", ["core"]);

        let second = catalog.register_if_absent("plank", "reps", ["shoulders", "back"]);
        assert_eq!(second.display_name, "Plank");
        assert_eq!(second.rep_unit, "seconds");
        assert_eq!(second.body_parts.len(), 1);
        assert!(second.body_parts.contains("core"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let catalog = ExerciseCatalog::new();
        assert!(catalog.lookup("deadlift").is_none());
        assert!(!catalog.contains("deadlift"));
    }

    #[test]
    fn test_names_sorted_case_insensitively() {
        let mut catalog = ExerciseCatalog::new();
        catalog.register_if_absent("squat", "reps", Vec::<String>::new());
        catalog.register_if_absent("Bench Press", "reps", ["chest"]);
        catalog.register_if_absent("Deadlift", "reps", ["back"]);

        assert_eq!(catalog.names(), vec!["Bench Press", "Deadlift", "squat"]);
    }

    #[test]
    fn test_serialized_shape() {
        let mut catalog = ExerciseCatalog::new();
        catalog.register_if_absent("Bench Press", "reps", ["chest", "triceps"]);

        let value = serde_json::to_value(&catalog).unwrap();
        let entry = &value["bench press"];
        assert_eq!(entry["displayName"], "Bench Press");
        assert_eq!(entry["repUnit"], "reps");
        assert_eq!(entry["bodyParts"], serde_json::json!(["chest", "triceps"]));
    }

    #[test]
    fn test_normalized_rekeys_imported_catalog() {
        let json = r#"{"Push-Up ": {"name": "Push-Up", "repType": "reps", "bodyParts": ["chest"]}}"#;
        let catalog: ExerciseCatalog = serde_json::from_str(json).unwrap();
        assert!(catalog.lookup("push-up").is_none());

        let catalog = catalog.normalized();
        assert_eq!(catalog.lookup("push-up").unwrap().display_name, "Push-Up");
    }
}
