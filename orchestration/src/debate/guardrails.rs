//! Iteration and revision guardrails for a debate run.

use serde::{Deserialize, Serialize};

use super::state::DebateState;

/// Outcome of a guardrail evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardrailOutcome {
    /// No guardrail triggered.
    Continue,
    /// Generation attempts reached the safety bound.
    IterationLimit { iterations: u32, limit: u32 },
    /// A draft failed verification more often than the revision budget allows.
    RevisionsExhausted { revisions: u32, limit: u32 },
}

impl GuardrailOutcome {
    /// Whether the guarded step must not proceed as normal.
    pub fn should_stop(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

impl std::fmt::Display for GuardrailOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::IterationLimit { iterations, limit } => {
                write!(f, "iteration_limit ({}/{})", iterations, limit)
            }
            Self::RevisionsExhausted { revisions, limit } => {
                write!(f, "revisions_exhausted ({}/{})", revisions, limit)
            }
        }
    }
}

/// Guardrail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Generation attempts allowed per debate before it is forced to end.
    pub max_iterations: u32,
    /// Revisions of a single draft before it is discarded and regenerated.
    pub max_revisions: u32,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            max_revisions: 2,
        }
    }
}

impl GuardrailConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_iterations == 0 {
            return Err("max_iterations must be > 0".to_string());
        }
        Ok(())
    }

    /// Checked before every generation attempt and again at each status check.
    pub fn check_iterations(&self, state: &DebateState) -> GuardrailOutcome {
        if state.iteration_count >= self.max_iterations {
            GuardrailOutcome::IterationLimit {
                iterations: state.iteration_count,
                limit: self.max_iterations,
            }
        } else {
            GuardrailOutcome::Continue
        }
    }

    /// Checked after a draft fails verification.
    pub fn check_revisions(&self, revisions: u32) -> GuardrailOutcome {
        if revisions >= self.max_revisions {
            GuardrailOutcome::RevisionsExhausted {
                revisions,
                limit: self.max_revisions,
            }
        } else {
            GuardrailOutcome::Continue
        }
    }
}
