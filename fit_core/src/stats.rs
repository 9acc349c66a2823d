//! Statistics aggregation over logged exercises.
//!
//! `summarize` is a pure single pass over a slice of entries. The summary
//! owns no state and can be recomputed from the day log at any time.

use crate::types::ExerciseEntry;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts and per-dimension breakdowns for a set of entries
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    pub total_exercises: usize,
    pub total_sets: usize,
    /// Sum of `weight * reps` over all weighted sets
    pub total_weight_moved: f64,
    /// Entries touching each body part (once per entry, not per set)
    pub count_by_body_part: BTreeMap<String, usize>,
    /// Reps of every set, added to each body part its entry is tagged with
    pub reps_by_body_part: BTreeMap<String, f64>,
    pub weight_by_exercise_name: BTreeMap<String, f64>,
    pub set_count_by_exercise_name: BTreeMap<String, usize>,
}

/// Aggregate a collection of entries into a summary
///
/// An entry tagged with several body parts counts its reps towards each of
/// them. Bodyweight sets add nothing to the weight totals, but every
/// exercise name still gets a weight slot so it shows up in charts.
pub fn summarize(entries: &[ExerciseEntry]) -> StatisticsSummary {
    let mut summary = StatisticsSummary {
        total_exercises: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        summary.total_sets += entry.sets.len();

        for part in &entry.body_parts {
            *summary.count_by_body_part.entry(part.clone()).or_insert(0) += 1;
            summary.reps_by_body_part.entry(part.clone()).or_insert(0.0);
        }

        *summary
            .set_count_by_exercise_name
            .entry(entry.name.clone())
            .or_insert(0) += entry.sets.len();
        let exercise_weight = summary
            .weight_by_exercise_name
            .entry(entry.name.clone())
            .or_insert(0.0);

        for set in &entry.sets {
            if let Some(weight) = set.weight {
                let moved = weight * set.reps;
                summary.total_weight_moved += moved;
                *exercise_weight += moved;
            }

            for part in &entry.body_parts {
                if let Some(reps) = summary.reps_by_body_part.get_mut(part) {
                    *reps += set.reps;
                }
            }
        }
    }

    tracing::debug!(
        "Summarized {} exercises, {} sets",
        summary.total_exercises,
        summary.total_sets
    );
    summary
}

/// A labelled value in a chart dataset
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Which breakdown a chart dataset shows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    ExercisesByBodyPart,
    RepsByBodyPart,
    WeightByExercise,
    SetsByExercise,
}

/// One chart-ready dataset derived from a summary
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

impl StatisticsSummary {
    pub fn is_empty(&self) -> bool {
        self.total_exercises == 0
    }

    /// Datasets for the four statistics charts; empty datasets are omitted
    pub fn chart_series(&self, weight_unit: &str) -> Vec<ChartSeries> {
        let candidates = [
            (
                ChartKind::ExercisesByBodyPart,
                "Exercises by Body Part".to_string(),
                to_points(&self.count_by_body_part, |v| *v as f64),
            ),
            (
                ChartKind::RepsByBodyPart,
                "Total Reps by Body Part".to_string(),
                to_points(&self.reps_by_body_part, |v| *v),
            ),
            (
                ChartKind::WeightByExercise,
                format!("Total Weight by Exercise ({})", weight_unit),
                to_points(&self.weight_by_exercise_name, |v| *v),
            ),
            (
                ChartKind::SetsByExercise,
                "Sets by Exercise".to_string(),
                to_points(&self.set_count_by_exercise_name, |v| *v as f64),
            ),
        ];

        candidates
            .into_iter()
            .filter(|(_, _, points)| !points.is_empty())
            .map(|(kind, title, points)| ChartSeries {
                kind,
                title,
                points,
            })
            .collect()
    }
}

fn to_points<V>(map: &BTreeMap<String, V>, value: impl Fn(&V) -> f64) -> Vec<ChartPoint> {
    map.iter()
        .map(|(label, v)| ChartPoint {
            label: label.clone(),
            value: value(v),
        })
        .collect()
}
