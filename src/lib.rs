//! # bkt-mastery - competency mastery estimation
//!
//! Pure Rust learning-progress algorithms:
//!
//! - **Bayesian Knowledge Tracing** - two-state hidden Markov model turning a
//!   right/wrong answer history into a mastery probability
//! - **Next-competency recommendation** - greedy pick over a prerequisite graph
//! - **Progress ledger** - per (user, competency) interaction logs with summaries
//!
//! ## Modules
//!
//! - [`bkt`] - BKT parameters and the mastery estimator
//! - [`recommend`] - prerequisite gating and next-content selection
//! - [`progress`] - in-memory progress tracking built on the two above
//! - [`sanitize`] - opt-in input cleanup for callers
//! - [`config`] - environment-driven estimator configuration
//! - [`logging`] - tracing subscriber setup
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use bkt_mastery::{Interaction, MasteryEstimator};
//!
//! let estimator = MasteryEstimator::default();
//! let mastery = estimator.mastery_level(&[Interaction::new(true)]);
//! assert!((mastery - 0.5333).abs() < 1e-3);
//! ```

#![deny(clippy::all)]

// ============================================================================
// Modules
// ============================================================================

pub mod bkt;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod recommend;
pub mod sanitize;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use bkt::{BktParams, MasteryEstimator};
pub use config::EstimatorConfig;
pub use error::{BktError, Result};
pub use progress::{CompetencyProgress, ProgressTracker, SaveOutcome, UserProgress};
pub use recommend::{
    candidate_competencies, is_mastered, prerequisites_met, recommend_next_content,
};
pub use types::*;
