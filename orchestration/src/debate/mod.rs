//! Debate Orchestration: Pro/Con Argument Loop
//!
//! State machine that alternates pro and con arguments about an article,
//! fact-checks every draft, revises rejected drafts, and yields to the caller
//! between turns.
//!
//! # Debate Flow
//!
//! ```text
//! Analyzing → GeneratingPro ─┐
//!                            ▼
//!   ┌──────────────→ FactChecking ──verified──→ Processing → AwaitingUserInput
//!   │                  │      │                                    │ (suspend)
//!   │            rejected   budget spent                           ▼
//!   │                  ▼      └──→ Generating(same side)     CheckingStatus
//!   └────────────── Revising                                  │         │
//!                                                   active, bound ok   inactive / bound hit
//!                                                             ▼         ▼
//!                                                   Generating(turn)   Ended
//! ```
//!
//! The iteration bound is enforced twice: before every generation (a
//! placeholder argument is substituted and the debate ends) and at every
//! status check.

pub mod checkpoint;
pub mod collaborators;
pub mod engine;
pub mod evidence;
pub mod guardrails;
pub mod input;
pub mod state;
pub mod turn;

pub use checkpoint::{
    validate_checkpoint, CheckpointManager, DebateCheckpoint, IntegrityStatus, PersistenceError,
};
pub use collaborators::{
    ArgumentRequest, GenerationCollaborator, RevisionRequest, Verdict, VerificationCollaborator,
};
pub use engine::{DebateEngine, EngineConfig, RunOutcome, RunReport, SAFETY_ABORT_FEEDBACK};
pub use evidence::{
    ClaimEvidence, ClaimReview, Evidence, EvidenceLookup, FactCheckVerifier, FactJudge, NoEvidence,
    DEFAULT_LOOKUP_TIMEOUT,
};
pub use guardrails::{GuardrailConfig, GuardrailOutcome};
pub use input::{apply_user_input, UserCommand};
pub use state::{
    Argument, Article, DebatePhase, DebateState, EndReason, Position, TransitionRecord,
    CONTEXT_WINDOW, TERMINATED_CONTENT,
};
pub use turn::{TurnCoordinator, TurnDecision};
