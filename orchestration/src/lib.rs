//! Debate Orchestration Library
//!
//! This library provides:
//! - A pro/con debate state machine with fact checking and revision
//! - Collaborator traits for summarization, argument writing and verification
//! - Evidence-backed verification that degrades gracefully when lookups fail
//! - Bounded retries with per-call timeouts
//! - Checkpointing, an in-memory session store, and a session service facade
//!
//! # Usage
//!
//! ```rust,ignore
//! use orchestration::debate::{Article, DebateEngine};
//!
//! let engine = DebateEngine::new(generator, verifier);
//! let state = engine.initialize(Article::new("Title", "Body"));
//! let report = engine.run(&state).await?;       // suspends after the first argument
//! let state = engine.apply_user_input(&report.state, "focus on costs")?;
//! let report = engine.run(&state).await?;
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod debate;
pub mod errors;
pub mod retry;
pub mod service;
pub mod session;

pub use debate::{
    Argument, Article, DebateEngine, DebatePhase, DebateState, EndReason, EngineConfig, Position,
    RunOutcome, RunReport,
};
pub use errors::{Collaborator, CollaboratorError, DebateError, DebateResult};
pub use retry::RetryPolicy;
pub use service::{ArgumentView, DebateService, DebateView};
pub use session::{InMemorySessionStore, SessionStore};
