//! Next-competency recommendation
//!
//! Greedy selection over a prerequisite graph:
//! - a node is a candidate when it is not yet mastered (mastery <= 0.95) and
//!   every prerequisite is above 0.8
//! - the candidate with the lowest mastery wins, ties go to the node listed
//!   first in the graph
//!
//! Competencies missing from the mastery map count as 0, so a node whose
//! prerequisite has never been practised is never recommended.

use crate::types::{
    CompetencyGraph, CompetencyNode, MasteryLevels, Recommendation, MASTERY_THRESHOLD,
    PREREQUISITE_THRESHOLD,
};

fn mastery_of(id: &str, levels: &MasteryLevels) -> f64 {
    levels.get(id).copied().unwrap_or(0.0)
}

/// Whether a competency counts as mastered
pub fn is_mastered(id: &str, levels: &MasteryLevels) -> bool {
    mastery_of(id, levels) > MASTERY_THRESHOLD
}

/// Whether every prerequisite of `node` is above the prerequisite threshold
pub fn prerequisites_met(node: &CompetencyNode, levels: &MasteryLevels) -> bool {
    node.prerequisites
        .iter()
        .all(|prerequisite| mastery_of(prerequisite, levels) > PREREQUISITE_THRESHOLD)
}

/// All recommendable competencies, in graph order
pub fn candidate_competencies(
    graph: &CompetencyGraph,
    levels: &MasteryLevels,
) -> Vec<Recommendation> {
    graph
        .nodes
        .iter()
        .filter(|node| !is_mastered(&node.id, levels) && prerequisites_met(node, levels))
        .map(|node| Recommendation {
            id: node.id.clone(),
            name: node.name.clone(),
            mastery: mastery_of(&node.id, levels),
        })
        .collect()
}

/// Least-mastered candidate, or `None` when nothing is unlocked and unmastered
pub fn recommend_next_content(
    graph: &CompetencyGraph,
    levels: &MasteryLevels,
) -> Option<Recommendation> {
    let mut best: Option<Recommendation> = None;

    for candidate in candidate_competencies(graph, levels) {
        // strict comparison keeps the first of equal candidates
        let lower = match &best {
            Some(current) => candidate.mastery < current.mastery,
            None => true,
        };
        if lower {
            best = Some(candidate);
        }
    }

    best
}
