//! User input between turns: control tokens and free-text instructions.

use tracing::info;

use crate::errors::{DebateError, DebateResult};

use super::state::{DebatePhase, DebateState, EndReason};

/// Interpretation of one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// `done` / `exit`: end the debate.
    Stop,
    /// `continue`: no new instruction.
    Continue,
    /// Anything else, kept verbatim.
    Instruction(String),
}

impl UserCommand {
    /// Control tokens match case-insensitively, ignoring surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("done") || token.eq_ignore_ascii_case("exit") {
            Self::Stop
        } else if token.eq_ignore_ascii_case("continue") {
            Self::Continue
        } else {
            Self::Instruction(raw.to_string())
        }
    }
}

/// Apply user input to a debate, returning the updated state.
///
/// The caller must run the engine again if the debate is still active.
pub fn apply_user_input(state: &DebateState, raw: &str) -> DebateResult<DebateState> {
    if state.phase == DebatePhase::Ended {
        return Err(DebateError::invalid("debate has already ended"));
    }
    if !state.phase.is_resting() {
        return Err(DebateError::invalid(format!(
            "cannot accept input while in phase {}",
            state.phase
        )));
    }

    let mut next = state.clone();
    match UserCommand::parse(raw) {
        UserCommand::Stop => {
            info!("user asked to end the debate");
            next.deactivate(EndReason::UserRequested);
        }
        UserCommand::Continue => {}
        UserCommand::Instruction(text) => next.user_inputs.push(text),
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::super::state::Article;
    use super::*;

    fn waiting_state() -> DebateState {
        let mut state = DebateState::new(Article::new("t", "b"));
        state.summary = Some("summary".into());
        state.phase = DebatePhase::AwaitingUserInput;
        state
    }

    #[test]
    fn test_parse_control_tokens() {
        assert_eq!(UserCommand::parse("done"), UserCommand::Stop);
        assert_eq!(UserCommand::parse("EXIT"), UserCommand::Stop);
        assert_eq!(UserCommand::parse("  Done \n"), UserCommand::Stop);
        assert_eq!(UserCommand::parse("Continue"), UserCommand::Continue);
        assert_eq!(
            UserCommand::parse("done deal"),
            UserCommand::Instruction("done deal".into())
        );
    }

    #[test]
    fn test_done_deactivates_without_recording_input() {
        let state = waiting_state();
        let next = apply_user_input(&state, "Done").unwrap();
        assert!(!next.is_active);
        assert_eq!(next.end_reason, Some(EndReason::UserRequested));
        assert!(next.user_inputs.is_empty());
    }

    #[test]
    fn test_continue_is_a_no_op() {
        let mut state = waiting_state();
        state.user_inputs.push("earlier".into());
        let next = apply_user_input(&state, "CONTINUE").unwrap();
        assert_eq!(next.user_inputs, state.user_inputs);
        assert_eq!(next.is_active, state.is_active);
        assert_eq!(next.iteration_count, state.iteration_count);
        assert_eq!(next.current_turn, state.current_turn);
        assert_eq!(next.phase, state.phase);
        assert_eq!(next.transitions.len(), state.transitions.len());
    }

    #[test]
    fn test_instruction_is_appended_verbatim() {
        let state = waiting_state();
        let next = apply_user_input(&state, "  Talk about housing costs ").unwrap();
        assert_eq!(next.user_inputs, vec!["  Talk about housing costs ".to_string()]);
        assert!(next.is_active);
    }

    #[test]
    fn test_input_rejected_after_end() {
        let mut state = waiting_state();
        state.deactivate(EndReason::IterationLimit);
        state.phase = DebatePhase::Ended;
        let err = apply_user_input(&state, "continue").unwrap_err();
        assert!(matches!(err, DebateError::InvalidState(_)));
    }

    #[test]
    fn test_input_leaves_original_untouched() {
        let state = waiting_state();
        let _ = apply_user_input(&state, "exit").unwrap();
        assert!(state.is_active);
    }
}
