//! LLM-backed collaborators and the HTTP/CLI surface for the debate engine.
//!
//! - `agents`: rig agents for the reader, the two writers and the fact checker
//! - `evidence`: Google Fact Check Tools claim search
//! - `server`: axum routes over `orchestration::DebateService`
//! - `cli`: interactive terminal debate with checkpoints

pub mod agents;
pub mod cli;
pub mod config;
pub mod evidence;
pub mod prompts;
pub mod server;

pub use agents::AgentFactory;
pub use config::AgentsConfig;
