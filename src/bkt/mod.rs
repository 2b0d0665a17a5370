//! Bayesian Knowledge Tracing
//!
//! Two-state (mastered / unmastered) hidden Markov model over a learner's
//! answer history (Corbett & Anderson observation model).
//!
//! Core principles:
//! - An observation updates the posterior with the guess/slip likelihoods
//! - Every observation is also an opportunity to learn: `L + (1 - L) * pT`
//! - Mastery is replayed from `pL0` over the full ordered history, so the
//!   result depends on answer order
//!
//! The estimator holds only its parameters and never mutates; it can be shared
//! freely across threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{BktError, Result};
use crate::types::{Interaction, DEFAULT_P_G, DEFAULT_P_L0, DEFAULT_P_S, DEFAULT_P_T};

// ==================== Parameters ====================

/// The four BKT parameters. All are probabilities in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BktParams {
    /// Prior probability of initial mastery
    #[serde(default = "default_p_l0")]
    pub p_l0: f64,
    /// Probability of moving from unmastered to mastered per opportunity
    #[serde(default = "default_p_t")]
    pub p_t: f64,
    /// Probability of guessing correctly while unmastered
    #[serde(default = "default_p_g")]
    pub p_g: f64,
    /// Probability of answering incorrectly despite mastery
    #[serde(default = "default_p_s")]
    pub p_s: f64,
}

fn default_p_l0() -> f64 {
    DEFAULT_P_L0
}

fn default_p_t() -> f64 {
    DEFAULT_P_T
}

fn default_p_g() -> f64 {
    DEFAULT_P_G
}

fn default_p_s() -> f64 {
    DEFAULT_P_S
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            p_l0: DEFAULT_P_L0,
            p_t: DEFAULT_P_T,
            p_g: DEFAULT_P_G,
            p_s: DEFAULT_P_S,
        }
    }
}

impl BktParams {
    /// Create validated parameters
    pub fn new(p_l0: f64, p_t: f64, p_g: f64, p_s: f64) -> Result<Self> {
        let params = Self {
            p_l0,
            p_t,
            p_g,
            p_s,
        };
        params.validate()?;
        Ok(params)
    }

    /// Alternative calibration with a higher prior and guess rate and a slower
    /// learning rate
    pub fn calibrated() -> Self {
        Self {
            p_l0: 0.3,
            p_t: 0.2,
            p_g: 0.25,
            p_s: 0.1,
        }
    }

    /// Check that every parameter is a finite probability
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("p_l0", self.p_l0),
            ("p_t", self.p_t),
            ("p_g", self.p_g),
            ("p_s", self.p_s),
        ];
        for (name, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(BktError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

// ==================== Estimator ====================

/// Mastery estimator for one parameter set.
///
/// Multiple estimators with different calibrations (e.g. per subject) can
/// coexist; none of them carries state between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MasteryEstimator {
    params: BktParams,
}

impl MasteryEstimator {
    /// Parameters are taken as given; use [`BktParams::new`] to validate them.
    pub fn new(params: BktParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BktParams {
        &self.params
    }

    /// Posterior mastery after observing one answer.
    ///
    /// Returns `current_mastery` unchanged when the evidence denominator is
    /// not positive.
    pub fn update_knowledge(&self, current_mastery: f64, is_correct: bool) -> f64 {
        let BktParams { p_g, p_s, .. } = self.params;

        let (numerator, denominator) = if is_correct {
            let numerator = current_mastery * (1.0 - p_s);
            (numerator, numerator + (1.0 - current_mastery) * p_g)
        } else {
            let numerator = current_mastery * p_s;
            (numerator, numerator + (1.0 - current_mastery) * (1.0 - p_g))
        };

        if denominator > 0.0 {
            numerator / denominator
        } else {
            current_mastery
        }
    }

    /// Learning transition between observations. Never decreases mastery.
    pub fn apply_learning(&self, mastery: f64) -> f64 {
        mastery + (1.0 - mastery) * self.params.p_t
    }

    /// One fold step: observation update followed by the learning transition.
    ///
    /// Folding new answers onto a previously computed (unclamped) mastery gives
    /// the same result as replaying the whole history.
    pub fn observe(&self, mastery: f64, is_correct: bool) -> f64 {
        self.apply_learning(self.update_knowledge(mastery, is_correct))
    }

    /// Mastery after replaying `interactions` in order from `pL0`
    pub fn mastery_level(&self, interactions: &[Interaction]) -> f64 {
        self.mastery_from_outcomes(interactions.iter().map(|i| i.correct))
    }

    /// Same as [`mastery_level`](Self::mastery_level) over bare outcomes
    pub fn mastery_from_outcomes<I>(&self, outcomes: I) -> f64
    where
        I: IntoIterator<Item = bool>,
    {
        let mastery = outcomes
            .into_iter()
            .fold(self.params.p_l0, |mastery, correct| {
                self.observe(mastery, correct)
            });
        mastery.min(1.0)
    }

    /// Mastery after each interaction, for progress charts.
    pub fn mastery_trajectory(&self, interactions: &[Interaction]) -> Vec<f64> {
        let mut mastery = self.params.p_l0;
        interactions
            .iter()
            .map(|interaction| {
                mastery = self.observe(mastery, interaction.correct);
                mastery.min(1.0)
            })
            .collect()
    }

    /// Replay many histories in parallel. Output order matches input order.
    pub fn batch_mastery_levels<K>(&self, histories: &[(K, Vec<Interaction>)]) -> Vec<(K, f64)>
    where
        K: Clone + Send + Sync,
    {
        histories
            .par_iter()
            .map(|(key, interactions)| (key.clone(), self.mastery_level(interactions)))
            .collect()
    }
}
