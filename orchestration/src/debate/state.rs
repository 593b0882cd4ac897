//! Debate state: article, arguments, phases, and the mutable aggregate the
//! engine threads through every transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of most recent arguments handed to a writer as context.
pub const CONTEXT_WINDOW: usize = 3;

/// Content of the synthetic argument substituted when the iteration bound is hit.
pub const TERMINATED_CONTENT: &str = "Debate ended due to iteration limit";

/// The article under debate. Immutable once the debate is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A debate side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pro,
    Con,
}

impl Position {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Pro => Self::Con,
            Self::Con => Self::Pro,
        }
    }

    /// Stance wording used in writer prompts.
    pub fn stance(self) -> &'static str {
        match self {
            Self::Pro => "supporting",
            Self::Con => "opposing",
        }
    }

    /// Upper-case label used when rendering arguments.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pro => "PRO",
            Self::Con => "CON",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pro => write!(f, "pro"),
            Self::Con => write!(f, "con"),
        }
    }
}

/// One debate contribution.
///
/// `number` is scoped to the position and assigned at creation. Only the
/// revision step rewrites `content`; `verified` is owned by fact checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    pub content: String,
    pub position: Position,
    pub number: u32,
    #[serde(default)]
    pub verified: bool,
}

impl Argument {
    /// A fresh, unverified draft.
    pub fn draft(content: impl Into<String>, position: Position, number: u32) -> Self {
        Self {
            content: content.into(),
            position,
            number,
            verified: false,
        }
    }

    /// The placeholder used when the iteration safety bound aborts generation.
    pub fn terminated(position: Position) -> Self {
        Self {
            content: TERMINATED_CONTENT.to_string(),
            position,
            number: 0,
            verified: true,
        }
    }

    /// Display block, e.g. `ARGUMENT #2 (CON):` followed by the body.
    pub fn render(&self) -> String {
        format!(
            "ARGUMENT #{} ({}):\n\n{}",
            self.number,
            self.position.label(),
            self.content
        )
    }

    /// One-line form used inside writer prompts.
    pub fn context_line(&self) -> String {
        format!(
            "Argument #{} ({}): {}",
            self.number,
            self.position.label(),
            self.content
        )
    }
}

/// Engine phases. `Ended` is terminal.
///
/// Only `Analyzing`, `AwaitingUserInput` and `Ended` are ever observed on a
/// stored state; the rest exist while a run is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    Analyzing,
    GeneratingPro,
    GeneratingCon,
    FactChecking,
    Processing,
    Revising,
    AwaitingUserInput,
    CheckingStatus,
    Ended,
}

impl DebatePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Phases a run may legally start from.
    pub fn is_resting(self) -> bool {
        matches!(self, Self::Analyzing | Self::AwaitingUserInput | Self::Ended)
    }

    pub fn generating(position: Position) -> Self {
        match position {
            Position::Pro => Self::GeneratingPro,
            Position::Con => Self::GeneratingCon,
        }
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::Analyzing => &[Self::GeneratingPro, Self::Ended],
            Self::GeneratingPro | Self::GeneratingCon => &[Self::FactChecking],
            Self::FactChecking => &[
                Self::Processing,
                Self::Revising,
                Self::GeneratingPro,
                Self::GeneratingCon,
            ],
            Self::Revising => &[Self::FactChecking],
            Self::Processing => &[Self::AwaitingUserInput],
            Self::AwaitingUserInput => &[Self::CheckingStatus],
            Self::CheckingStatus => &[Self::GeneratingPro, Self::GeneratingCon, Self::Ended],
            Self::Ended => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analyzing => write!(f, "analyzing"),
            Self::GeneratingPro => write!(f, "generating_pro"),
            Self::GeneratingCon => write!(f, "generating_con"),
            Self::FactChecking => write!(f, "fact_checking"),
            Self::Processing => write!(f, "processing"),
            Self::Revising => write!(f, "revising"),
            Self::AwaitingUserInput => write!(f, "awaiting_user_input"),
            Self::CheckingStatus => write!(f, "checking_status"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Why a debate stopped being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The user sent `done` or `exit`.
    UserRequested,
    /// The iteration safety bound fired.
    IterationLimit,
    /// The session layer cancelled the debate.
    Cancelled,
    /// Analyze-only configuration finished its single step.
    AnalysisOnly,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserRequested => write!(f, "user_requested"),
            Self::IterationLimit => write!(f, "iteration_limit"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::AnalysisOnly => write!(f, "analysis_only"),
        }
    }
}

/// A recorded phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: DebatePhase,
    pub to: DebatePhase,
    /// Value of `iteration_count` after the transition's side effects.
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// The single mutable aggregate threaded through the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    pub article: Article,
    pub summary: Option<String>,
    /// Verified arguments only, in the order they were processed.
    pub arguments: Vec<Argument>,
    pub current_turn: Position,
    pub pro_count: u32,
    pub con_count: u32,
    pub user_inputs: Vec<String>,
    pub is_active: bool,
    pub iteration_count: u32,
    pub phase: DebatePhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,
    #[serde(default)]
    pub transitions: Vec<TransitionRecord>,
}

impl DebateState {
    /// Fresh state: pro to move, counters zero, active, about to analyze.
    pub fn new(article: Article) -> Self {
        Self {
            article,
            summary: None,
            arguments: Vec::new(),
            current_turn: Position::Pro,
            pro_count: 0,
            con_count: 0,
            user_inputs: Vec::new(),
            is_active: true,
            iteration_count: 0,
            phase: DebatePhase::Analyzing,
            end_reason: None,
            transitions: Vec::new(),
        }
    }

    /// Verified-argument count for one side.
    pub fn count(&self, position: Position) -> u32 {
        match position {
            Position::Pro => self.pro_count,
            Position::Con => self.con_count,
        }
    }

    /// Sequence number the next argument for `position` will carry.
    pub fn next_number(&self, position: Position) -> u32 {
        self.count(position) + 1
    }

    /// Most recent user input, or empty when none was given.
    pub fn latest_user_input(&self) -> &str {
        self.user_inputs.last().map(String::as_str).unwrap_or("")
    }

    /// The last [`CONTEXT_WINDOW`] arguments, oldest first.
    pub fn recent_arguments(&self) -> &[Argument] {
        let start = self.arguments.len().saturating_sub(CONTEXT_WINDOW);
        &self.arguments[start..]
    }

    /// Mark the debate inactive. The first reason recorded wins.
    pub fn deactivate(&mut self, reason: EndReason) {
        self.is_active = false;
        if self.end_reason.is_none() {
            self.end_reason = Some(reason);
        }
    }

    /// Session-layer cancellation; observed by the engine at the next status check.
    pub fn cancel(&mut self) {
        self.deactivate(EndReason::Cancelled);
    }

    /// Whether the engine suspended waiting on the caller.
    pub fn is_waiting_for_user(&self) -> bool {
        self.phase == DebatePhase::AwaitingUserInput
    }

    /// Append a verified argument, bump its side's counter and hand the turn over.
    pub(crate) fn commit_argument(&mut self, argument: Argument) {
        match argument.position {
            Position::Pro => self.pro_count += 1,
            Position::Con => self.con_count += 1,
        }
        self.arguments.push(argument);
        self.current_turn = self.current_turn.opponent();
    }

    pub(crate) fn record_transition(&mut self, to: DebatePhase, reason: Option<String>) {
        self.transitions.push(TransitionRecord {
            from: self.phase,
            to,
            iteration: self.iteration_count,
            timestamp: Utc::now(),
            reason,
        });
        self.phase = to;
    }

    /// Check the structural invariants of a stored state.
    ///
    /// Returns every violation found, so checkpoint validation can report them
    /// all at once.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let total = self.pro_count as usize + self.con_count as usize;
        if total != self.arguments.len() {
            errors.push(format!(
                "pro_count {} + con_count {} != {} arguments",
                self.pro_count,
                self.con_count,
                self.arguments.len()
            ));
        }

        for position in [Position::Pro, Position::Con] {
            let numbers: Vec<u32> = self
                .arguments
                .iter()
                .filter(|a| a.position == position)
                .map(|a| a.number)
                .collect();
            if numbers.len() != self.count(position) as usize {
                errors.push(format!(
                    "{} counter {} disagrees with {} recorded {} arguments",
                    position,
                    self.count(position),
                    numbers.len(),
                    position
                ));
            }
            if numbers.iter().enumerate().any(|(i, n)| *n != i as u32 + 1) {
                errors.push(format!("{position} argument numbers are not 1..n: {numbers:?}"));
            }
        }

        if let Some(bad) = self.arguments.iter().find(|a| !a.verified) {
            errors.push(format!(
                "unverified {} argument #{} in the debate record",
                bad.position, bad.number
            ));
        }

        if !self.phase.is_resting() {
            errors.push(format!("state stored mid-run in phase {}", self.phase));
        }
        if self.phase == DebatePhase::Ended && self.is_active {
            errors.push("ended debate is still marked active".to_string());
        }
        if let Some(last) = self.transitions.last() {
            if last.to != self.phase {
                errors.push(format!(
                    "last transition target {} doesn't match current phase {}",
                    last.to, self.phase
                ));
            }
        }

        errors
    }
}
