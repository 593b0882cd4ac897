//! Turn coordination: who moves next, or whether the debate is over.

use super::guardrails::{GuardrailConfig, GuardrailOutcome};
use super::state::{DebateState, EndReason, Position};

/// Decision taken at `CheckingStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDecision {
    /// Generate the next argument for this side.
    Generate(Position),
    /// Stop the debate.
    End(EndReason),
}

/// Pure termination and alternation policy.
///
/// Alternation is strictly by `current_turn`; nothing here mutates state.
pub struct TurnCoordinator<'a> {
    guardrails: &'a GuardrailConfig,
}

impl<'a> TurnCoordinator<'a> {
    pub fn new(guardrails: &'a GuardrailConfig) -> Self {
        Self { guardrails }
    }

    pub fn decide(&self, state: &DebateState) -> TurnDecision {
        if !state.is_active {
            return TurnDecision::End(state.end_reason.unwrap_or(EndReason::Cancelled));
        }
        if let GuardrailOutcome::IterationLimit { .. } = self.guardrails.check_iterations(state) {
            return TurnDecision::End(EndReason::IterationLimit);
        }
        TurnDecision::Generate(state.current_turn)
    }
}

#[cfg(test)]
mod tests {
    use super::super::state::Article;
    use super::*;

    fn state() -> DebateState {
        DebateState::new(Article::new("t", "b"))
    }

    #[test]
    fn test_active_debate_follows_current_turn() {
        let config = GuardrailConfig::default();
        let coordinator = TurnCoordinator::new(&config);
        let mut s = state();
        assert_eq!(coordinator.decide(&s), TurnDecision::Generate(Position::Pro));
        s.current_turn = Position::Con;
        assert_eq!(coordinator.decide(&s), TurnDecision::Generate(Position::Con));
    }

    #[test]
    fn test_inactive_debate_ends_with_its_reason() {
        let config = GuardrailConfig::default();
        let coordinator = TurnCoordinator::new(&config);
        let mut s = state();
        s.deactivate(EndReason::UserRequested);
        assert_eq!(
            coordinator.decide(&s),
            TurnDecision::End(EndReason::UserRequested)
        );
    }

    #[test]
    fn test_inactive_without_reason_counts_as_cancelled() {
        let config = GuardrailConfig::default();
        let coordinator = TurnCoordinator::new(&config);
        let mut s = state();
        s.is_active = false;
        assert_eq!(coordinator.decide(&s), TurnDecision::End(EndReason::Cancelled));
    }

    #[test]
    fn test_iteration_bound_ends_active_debate() {
        let config = GuardrailConfig::default();
        let coordinator = TurnCoordinator::new(&config);
        let mut s = state();
        s.iteration_count = 3;
        assert_eq!(
            coordinator.decide(&s),
            TurnDecision::End(EndReason::IterationLimit)
        );
    }
}
