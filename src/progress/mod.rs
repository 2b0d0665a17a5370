//! Progress Ledger
//!
//! In-memory interaction logs per (user, competency) with the mastery derived
//! from them. Two write paths:
//! - [`ProgressTracker::save_progress`] replaces the log with a full history and
//!   replays it from the prior
//! - [`ProgressTracker::record_interactions`] appends new answers and folds only
//!   those onto the stored mastery, which equals a replay of the whole log
//!
//! Reads produce the per-user and per-competency summaries used by dashboards.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bkt::MasteryEstimator;
use crate::recommend::recommend_next_content;
use crate::types::{
    CompetencyGraph, Interaction, MasteryLevels, Recommendation, MASTERY_THRESHOLD,
};

// ==================== Data Structures ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub mastery_level: f64,
    pub next_recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    pub mastery_levels: MasteryLevels,
    pub total_interactions: usize,
    /// Mastered competency ids, sorted
    pub badges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyProgress {
    pub competency_id: String,
    pub total_students: usize,
    pub average_mastery: f64,
}

#[derive(Debug, Clone)]
struct ProgressRecord {
    interactions: Vec<Interaction>,
    /// Fold result before the final clamp, so appends continue exactly
    raw_mastery: f64,
}

impl ProgressRecord {
    fn mastery(&self) -> f64 {
        self.raw_mastery.min(1.0)
    }
}

type UserRecords = HashMap<String, ProgressRecord>;

// ==================== Tracker ====================

pub struct ProgressTracker {
    estimator: MasteryEstimator,
    graph: Option<CompetencyGraph>,
    /// user id -> competency id -> record
    records: RwLock<HashMap<String, UserRecords>>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new(MasteryEstimator::default())
    }
}

impl ProgressTracker {
    pub fn new(estimator: MasteryEstimator) -> Self {
        Self {
            estimator,
            graph: None,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a competency graph so saves come back with a recommendation
    pub fn with_graph(mut self, graph: CompetencyGraph) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn estimator(&self) -> &MasteryEstimator {
        &self.estimator
    }

    pub fn graph(&self) -> Option<&CompetencyGraph> {
        self.graph.as_ref()
    }

    fn fold(&self, start: f64, interactions: &[Interaction]) -> f64 {
        interactions
            .iter()
            .fold(start, |mastery, i| self.estimator.observe(mastery, i.correct))
    }

    /// Replace the stored history for (user, competency) and recompute mastery
    pub fn save_progress(
        &self,
        user_id: &str,
        competency_id: &str,
        interactions: Vec<Interaction>,
    ) -> SaveOutcome {
        let raw_mastery = self.fold(self.estimator.params().p_l0, &interactions);
        self.upsert(user_id, competency_id, |record| {
            record.interactions = interactions;
            record.raw_mastery = raw_mastery;
        })
    }

    /// Append new answers to the stored history and fold them onto the stored mastery
    pub fn record_interactions(
        &self,
        user_id: &str,
        competency_id: &str,
        new_interactions: &[Interaction],
    ) -> SaveOutcome {
        self.upsert(user_id, competency_id, |record| {
            record.raw_mastery = self.fold(record.raw_mastery, new_interactions);
            record.interactions.extend_from_slice(new_interactions);
        })
    }

    fn upsert<F>(&self, user_id: &str, competency_id: &str, update: F) -> SaveOutcome
    where
        F: FnOnce(&mut ProgressRecord),
    {
        let prior = self.estimator.params().p_l0;

        let (previous, mastery_level, interaction_count, levels) = {
            let mut records = self.records.write();
            let user_records = records.entry(user_id.to_string()).or_default();
            let record = user_records
                .entry(competency_id.to_string())
                .or_insert_with(|| ProgressRecord {
                    interactions: Vec::new(),
                    raw_mastery: prior,
                });

            let previous = record.mastery();
            update(record);
            let mastery_level = record.mastery();
            let interaction_count = record.interactions.len();

            (previous, mastery_level, interaction_count, levels_of(user_records))
        };

        if mastery_level > MASTERY_THRESHOLD && previous <= MASTERY_THRESHOLD {
            info!(user_id, competency_id, mastery_level, "competency mastered");
        }
        debug!(
            user_id,
            competency_id,
            interactions = interaction_count,
            mastery_level,
            "progress saved"
        );

        let next_recommendation = self
            .graph
            .as_ref()
            .and_then(|graph| recommend_next_content(graph, &levels));

        SaveOutcome {
            mastery_level,
            next_recommendation,
        }
    }

    /// Current mastery per competency for one user
    pub fn mastery_levels(&self, user_id: &str) -> MasteryLevels {
        self.records
            .read()
            .get(user_id)
            .map(levels_of)
            .unwrap_or_default()
    }

    /// Next competency for the user, `None` without an attached graph
    pub fn recommend_for(&self, user_id: &str) -> Option<Recommendation> {
        let graph = self.graph.as_ref()?;
        recommend_next_content(graph, &self.mastery_levels(user_id))
    }

    pub fn interactions(&self, user_id: &str, competency_id: &str) -> Vec<Interaction> {
        self.records
            .read()
            .get(user_id)
            .and_then(|records| records.get(competency_id))
            .map(|record| record.interactions.clone())
            .unwrap_or_default()
    }

    pub fn user_progress(&self, user_id: &str) -> UserProgress {
        let records = self.records.read();
        let user_records = records.get(user_id);

        let mastery_levels = user_records.map(levels_of).unwrap_or_default();
        let total_interactions: usize = user_records
            .map(|r| r.values().map(|record| record.interactions.len()).sum())
            .unwrap_or(0);

        let mut badges: Vec<String> = mastery_levels
            .iter()
            .filter(|(_, mastery)| **mastery > MASTERY_THRESHOLD)
            .map(|(id, _)| id.clone())
            .collect();
        badges.sort();

        UserProgress {
            user_id: user_id.to_string(),
            mastery_levels,
            total_interactions,
            badges,
        }
    }

    pub fn competency_progress(&self, competency_id: &str) -> CompetencyProgress {
        let records = self.records.read();
        let masteries: Vec<f64> = records
            .values()
            .filter_map(|user_records| user_records.get(competency_id))
            .map(ProgressRecord::mastery)
            .collect();

        let total_students = masteries.len();
        let average_mastery = if total_students > 0 {
            masteries.iter().sum::<f64>() / total_students as f64
        } else {
            0.0
        };

        CompetencyProgress {
            competency_id: competency_id.to_string(),
            total_students,
            average_mastery,
        }
    }
}

fn levels_of(records: &UserRecords) -> MasteryLevels {
    records
        .iter()
        .map(|(id, record)| (id.clone(), record.mastery()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompetencyNode;
    use std::sync::Arc;

    const TOL: f64 = 1e-9;

    fn answers(outcomes: &[bool]) -> Vec<Interaction> {
        outcomes.iter().copied().map(Interaction::new).collect()
    }

    fn graph() -> CompetencyGraph {
        CompetencyGraph::new(vec![
            CompetencyNode::new("cs_001", "Variables and Data Types"),
            CompetencyNode::new("cs_002", "Control Flow").with_prerequisites(["cs_001"]),
        ])
    }

    #[test]
    fn test_save_progress_matches_estimator() {
        let tracker = ProgressTracker::default();
        let history = answers(&[true, false, true]);

        let outcome = tracker.save_progress("u1", "cs_001", history.clone());

        let expected = MasteryEstimator::default().mastery_level(&history);
        assert!((outcome.mastery_level - expected).abs() < TOL);
        assert!(outcome.next_recommendation.is_none());
        assert_eq!(tracker.interactions("u1", "cs_001"), history);
    }

    #[test]
    fn test_save_progress_replaces_history() {
        let tracker = ProgressTracker::default();
        tracker.save_progress("u1", "cs_001", answers(&[false, false, false]));
        let outcome = tracker.save_progress("u1", "cs_001", answers(&[true]));

        assert!((outcome.mastery_level - 0.5333).abs() < 1e-4);
        assert_eq!(tracker.interactions("u1", "cs_001").len(), 1);
    }

    #[test]
    fn test_record_interactions_equals_full_replay() {
        let tracker = ProgressTracker::default();
        let history = answers(&[true, true, false, true, false, true]);

        tracker.record_interactions("u1", "cs_001", &history[..2]);
        tracker.record_interactions("u1", "cs_001", &history[2..5]);
        let outcome = tracker.record_interactions("u1", "cs_001", &history[5..]);

        let expected = MasteryEstimator::default().mastery_level(&history);
        assert!((outcome.mastery_level - expected).abs() < TOL);
        assert_eq!(tracker.interactions("u1", "cs_001"), history);
    }

    #[test]
    fn test_record_nothing_reports_prior() {
        let tracker = ProgressTracker::default();
        let outcome = tracker.record_interactions("u1", "cs_001", &[]);
        assert_eq!(outcome.mastery_level, 0.1);
    }

    #[test]
    fn test_save_returns_recommendation_with_graph() {
        let tracker = ProgressTracker::default().with_graph(graph());

        let outcome = tracker.save_progress("u1", "cs_001", answers(&[false]));
        assert_eq!(outcome.next_recommendation.unwrap().id, "cs_001");

        let outcome = tracker.save_progress("u1", "cs_001", answers(&[true; 4]));
        assert!(outcome.mastery_level > 0.8);
        let next = outcome.next_recommendation.unwrap();
        assert_eq!(next.id, "cs_002");
        assert_eq!(next.mastery, 0.0);
        assert_eq!(tracker.recommend_for("u1").unwrap().id, "cs_002");
    }

    #[test]
    fn test_recommend_for_without_graph() {
        let tracker = ProgressTracker::default();
        tracker.save_progress("u1", "cs_001", answers(&[true]));
        assert!(tracker.recommend_for("u1").is_none());
    }

    #[test]
    fn test_user_progress_summary() {
        let tracker = ProgressTracker::default();
        tracker.save_progress("u1", "cs_002", answers(&[true; 6]));
        tracker.save_progress("u1", "cs_001", answers(&[true; 6]));
        tracker.save_progress("u1", "cs_003", answers(&[false, true]));
        tracker.save_progress("u2", "cs_001", answers(&[true]));

        let summary = tracker.user_progress("u1");
        assert_eq!(summary.user_id, "u1");
        assert_eq!(summary.mastery_levels.len(), 3);
        assert_eq!(summary.total_interactions, 14);
        assert_eq!(summary.badges, vec!["cs_001".to_string(), "cs_002".to_string()]);

        let empty = tracker.user_progress("nobody");
        assert!(empty.mastery_levels.is_empty());
        assert_eq!(empty.total_interactions, 0);
        assert!(empty.badges.is_empty());
    }

    #[test]
    fn test_competency_progress_summary() {
        let tracker = ProgressTracker::default();
        let a = tracker.save_progress("u1", "cs_001", answers(&[true])).mastery_level;
        let b = tracker.save_progress("u2", "cs_001", answers(&[false])).mastery_level;
        tracker.save_progress("u3", "cs_002", answers(&[true]));

        let summary = tracker.competency_progress("cs_001");
        assert_eq!(summary.total_students, 2);
        assert!((summary.average_mastery - (a + b) / 2.0).abs() < TOL);

        let none = tracker.competency_progress("cs_999");
        assert_eq!(none.total_students, 0);
        assert_eq!(none.average_mastery, 0.0);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let tracker = ProgressTracker::default();
        tracker.save_progress("u1", "cs_001", answers(&[true]));
        let json = serde_json::to_value(tracker.user_progress("u1")).unwrap();
        assert!(json.get("masteryLevels").is_some());
        assert!(json.get("totalInteractions").is_some());
    }

    #[test]
    fn test_concurrent_recording() {
        let tracker = Arc::new(ProgressTracker::default());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        tracker.record_interactions(&format!("u{}", t), "cs_001", &answers(&[true]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let expected = MasteryEstimator::default().mastery_level(&answers(&[true; 25]));
        for t in 0..8 {
            let progress = tracker.user_progress(&format!("u{}", t));
            assert_eq!(progress.total_interactions, 25);
            assert!((progress.mastery_levels["cs_001"] - expected).abs() < TOL);
        }
    }
}
