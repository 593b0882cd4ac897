//! Debate checkpoints: JSON snapshots of a stored debate state, restored only
//! after an integrity check.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::state::DebateState;

/// A complete debate checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateCheckpoint {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub debate_id: String,
    /// The state at checkpoint time. Always a resting state.
    pub state: DebateState,
    /// Why the checkpoint was taken.
    pub reason: String,
    /// Monotonic checkpoint sequence number.
    pub sequence: u32,
    pub created_at: DateTime<Utc>,
}

impl DebateCheckpoint {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(debate_id: &str, state: &DebateState, reason: &str, sequence: u32) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            debate_id: debate_id.to_string(),
            state: state.clone(),
            reason: reason.to_string(),
            sequence,
            created_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if checkpoint.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }
}

/// Error during checkpoint operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("serialize failed: {reason}")]
    SerializeFailed { reason: String },
    #[error("deserialize failed: {reason}")]
    DeserializeFailed { reason: String },
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("integrity check failed: {reason}")]
    IntegrityCheckFailed { reason: String },
    #[error("checkpoint io failed: {reason}")]
    Io { reason: String },
}

/// Integrity check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    Valid,
    /// Minor issues; resuming is still safe.
    Recoverable { warnings: Vec<String> },
    /// Cannot be resumed.
    Corrupted { errors: Vec<String> },
}

impl IntegrityStatus {
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Valid | Self::Recoverable { .. })
    }
}

/// Validate a checkpoint before resuming it.
pub fn validate_checkpoint(checkpoint: &DebateCheckpoint) -> IntegrityStatus {
    let mut errors = checkpoint.state.invariant_violations();
    let mut warnings: Vec<String> = Vec::new();

    if checkpoint.version > DebateCheckpoint::CURRENT_VERSION {
        errors.push(format!(
            "version {} > current {}",
            checkpoint.version,
            DebateCheckpoint::CURRENT_VERSION
        ));
    }

    if checkpoint.debate_id.trim().is_empty() {
        errors.push("empty debate id".to_string());
    }

    let state = &checkpoint.state;
    if state.transitions.is_empty() && !state.arguments.is_empty() {
        warnings.push(format!(
            "{} arguments but no transition history",
            state.arguments.len()
        ));
    }
    if state.summary.is_none() && !state.arguments.is_empty() {
        errors.push("arguments recorded without a summary".to_string());
    }
    if checkpoint.sequence == 0 {
        warnings.push("sequence 0 was never issued by a checkpoint manager".to_string());
    }

    if !errors.is_empty() {
        IntegrityStatus::Corrupted { errors }
    } else if !warnings.is_empty() {
        IntegrityStatus::Recoverable { warnings }
    } else {
        IntegrityStatus::Valid
    }
}

/// Issues sequenced checkpoints for one debate and keeps the most recent few.
pub struct CheckpointManager {
    debate_id: String,
    sequence: u32,
    max_retained: usize,
    checkpoints: Vec<DebateCheckpoint>,
}

impl CheckpointManager {
    pub fn new(debate_id: impl Into<String>, max_retained: usize) -> Self {
        Self {
            debate_id: debate_id.into(),
            sequence: 0,
            max_retained: max_retained.max(1),
            checkpoints: Vec::new(),
        }
    }

    /// Continue numbering after a restored checkpoint.
    pub fn resume_from(checkpoint: &DebateCheckpoint, max_retained: usize) -> Self {
        let mut manager = Self::new(checkpoint.debate_id.clone(), max_retained);
        manager.sequence = checkpoint.sequence;
        manager
    }

    pub fn debate_id(&self) -> &str {
        &self.debate_id
    }

    pub fn checkpoint(&mut self, state: &DebateState, reason: &str) -> DebateCheckpoint {
        self.sequence += 1;
        let cp = DebateCheckpoint::new(&self.debate_id, state, reason, self.sequence);
        self.checkpoints.push(cp.clone());
        while self.checkpoints.len() > self.max_retained {
            self.checkpoints.remove(0);
        }
        cp
    }

    pub fn latest(&self) -> Option<&DebateCheckpoint> {
        self.checkpoints.last()
    }

    pub fn count(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn current_sequence(&self) -> u32 {
        self.sequence
    }

    /// Take a checkpoint and write it to `path`.
    pub fn save(
        &mut self,
        state: &DebateState,
        reason: &str,
        path: &Path,
    ) -> Result<DebateCheckpoint, PersistenceError> {
        let cp = self.checkpoint(state, reason);
        std::fs::write(path, cp.to_json()?).map_err(|e| PersistenceError::Io {
            reason: format!("{}: {e}", path.display()),
        })?;
        info!(
            debate_id = %self.debate_id,
            sequence = cp.sequence,
            path = %path.display(),
            "Checkpoint written"
        );
        Ok(cp)
    }

    /// Restore from JSON, validating integrity.
    pub fn restore(json: &str) -> Result<(DebateCheckpoint, IntegrityStatus), PersistenceError> {
        let checkpoint = DebateCheckpoint::from_json(json)?;
        let status = validate_checkpoint(&checkpoint);

        match &status {
            IntegrityStatus::Corrupted { errors } => {
                return Err(PersistenceError::IntegrityCheckFailed {
                    reason: errors.join("; "),
                })
            }
            IntegrityStatus::Recoverable { warnings } => {
                for w in warnings {
                    warn!(debate_id = %checkpoint.debate_id, "Checkpoint warning: {w}");
                }
            }
            IntegrityStatus::Valid => {}
        }

        Ok((checkpoint, status))
    }

    pub fn load(path: &Path) -> Result<(DebateCheckpoint, IntegrityStatus), PersistenceError> {
        let json = std::fs::read_to_string(path).map_err(|e| PersistenceError::Io {
            reason: format!("{}: {e}", path.display()),
        })?;
        Self::restore(&json)
    }
}
