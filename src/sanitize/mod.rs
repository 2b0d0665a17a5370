//! Data Sanitization
//!
//! The estimator and recommender trust their inputs. These helpers are for
//! callers that load mastery values from storage or user input and want them
//! in range before handing them over.

use crate::types::MasteryLevels;

/// Finite and within [0, 1]
pub fn is_valid_probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// 将数值限制在 [0, 1]，NaN 视为 0
pub fn clamp_probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp every entry in place. Returns how many entries were changed.
pub fn sanitize_mastery_levels(levels: &mut MasteryLevels) -> usize {
    let mut fixed = 0;
    for value in levels.values_mut() {
        if !is_valid_probability(*value) {
            *value = clamp_probability(*value);
            fixed += 1;
        }
    }
    fixed
}
