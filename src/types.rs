//! Common Types and Constants
//!
//! Shared data structures used across the estimator, recommender and ledger.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};

// ==================== Constants ====================

/// Prior probability of initial mastery (pL0)
pub const DEFAULT_P_L0: f64 = 0.1;

/// Probability of learning after an opportunity (pT)
pub const DEFAULT_P_T: f64 = 0.3;

/// Probability of a correct guess while unmastered (pG)
pub const DEFAULT_P_G: f64 = 0.2;

/// Probability of a slip while mastered (pS)
pub const DEFAULT_P_S: f64 = 0.1;

/// A competency is mastered when its mastery is strictly above this
pub const MASTERY_THRESHOLD: f64 = 0.95;

/// A prerequisite is met when its mastery is strictly above this
pub const PREREQUISITE_THRESHOLD: f64 = 0.8;

/// Mastery level keyed by competency id
pub type MasteryLevels = HashMap<String, f64>;

// ==================== Interactions ====================

/// One answered question. Extra fields in serialized records are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interaction {
    /// Whether the answer was correct
    #[serde(default)]
    pub correct: bool,
}

impl Interaction {
    pub fn new(correct: bool) -> Self {
        Self { correct }
    }
}

impl From<bool> for Interaction {
    fn from(correct: bool) -> Self {
        Self { correct }
    }
}

// ==================== Competency Graph ====================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompetencyNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Competency ids that must be mastered first
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

impl CompetencyNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            prerequisites: Vec::new(),
        }
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }
}

/// Prerequisite graph over competencies.
///
/// Node order is significant: the recommender breaks mastery ties in favour of
/// the node listed first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetencyGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub nodes: Vec<CompetencyNode>,
}

impl CompetencyGraph {
    pub fn new(nodes: Vec<CompetencyNode>) -> Self {
        Self {
            subject: None,
            nodes,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn node(&self, id: &str) -> Option<&CompetencyNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integrity check for externally supplied graphs.
    ///
    /// Rejects duplicate ids, self-prerequisites and prerequisites that name a
    /// competency missing from the graph. Cycles between distinct nodes are
    /// not detected; such nodes are simply never recommended.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(BktError::DuplicateCompetency(node.id.clone()));
            }
        }

        for node in &self.nodes {
            for prerequisite in &node.prerequisites {
                if prerequisite == &node.id {
                    return Err(BktError::SelfPrerequisite(node.id.clone()));
                }
                if !seen.contains(prerequisite.as_str()) {
                    return Err(BktError::UnknownPrerequisite {
                        competency: node.id.clone(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ==================== Recommendation ====================

/// Competency chosen as the next thing to study
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub name: String,
    /// Current mastery (0 when the learner has no record yet)
    pub mastery: f64,
}
