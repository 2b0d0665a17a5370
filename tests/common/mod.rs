#![allow(dead_code)]

use bkt_mastery::{CompetencyGraph, CompetencyNode, Interaction, MasteryLevels};

/// Computer Science fundamentals curriculum used across the integration tests
pub fn cs_fundamentals() -> CompetencyGraph {
    CompetencyGraph::new(vec![
        CompetencyNode::new("cs_001", "Variables and Data Types"),
        CompetencyNode::new("cs_002", "Control Flow").with_prerequisites(["cs_001"]),
        CompetencyNode::new("cs_003", "Functions").with_prerequisites(["cs_001", "cs_002"]),
        CompetencyNode::new("cs_004", "Recursion").with_prerequisites(["cs_003"]),
        CompetencyNode::new("cs_005", "Arrays").with_prerequisites(["cs_002", "cs_003"]),
    ])
    .with_subject("Computer Science Fundamentals")
}

pub fn answers(outcomes: &[bool]) -> Vec<Interaction> {
    outcomes.iter().copied().map(Interaction::new).collect()
}

pub fn levels(entries: &[(&str, f64)]) -> MasteryLevels {
    entries
        .iter()
        .map(|(id, mastery)| (id.to_string(), *mastery))
        .collect()
}
