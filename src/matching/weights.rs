use serde::{Deserialize, Serialize};

use crate::error::MatchError;

const SUM_TOLERANCE: f64 = 1e-6;

/// Default factor-group weights: semantic 0.40, skills 0.35,
/// experience 0.15, other 0.10.
pub const DEFAULT_WEIGHTS: MatchWeights = MatchWeights {
    semantic: 0.40,
    skills: 0.35,
    experience: 0.15,
    other: 0.10,
};

/// Relative weight of each factor group in the overall score.
///
/// Construction validates that the weights sum to 1.0; an unnormalized
/// vector is rejected up front rather than silently producing scores
/// outside the 0-100 rubric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub semantic: f64,
    pub skills: f64,
    pub experience: f64,
    pub other: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl MatchWeights {
    pub fn new(semantic: f64, skills: f64, experience: f64, other: f64) -> Result<Self, MatchError> {
        let weights = MatchWeights {
            semantic,
            skills,
            experience,
            other,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn sum(&self) -> f64 {
        self.semantic + self.skills + self.experience + self.other
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        let components = [
            ("semantic", self.semantic),
            ("skills", self.skills),
            ("experience", self.experience),
            ("other", self.other),
        ];
        for (name, value) in components {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(MatchError::InvalidWeights(format!(
                    "{name} weight {value} is outside [0, 1]"
                )));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(MatchError::InvalidWeights(format!(
                "weights sum to {sum}, expected 1.0"
            )));
        }
        Ok(())
    }
}
