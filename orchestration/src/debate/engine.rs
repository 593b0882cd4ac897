//! Debate engine: runs a debate from its stored phase until it suspends for
//! user input or ends.
//!
//! Every step receives exactly one typed payload ([`Step`]), so each
//! transition has a single input shape. A run works on a private copy of the
//! caller's state and hands it back only when the run completes, so a failed
//! run leaves the caller's state untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{Collaborator, CollaboratorError, DebateError, DebateResult};
use crate::retry::{self, RetryPolicy};

use super::collaborators::{
    ArgumentRequest, GenerationCollaborator, RevisionRequest, VerificationCollaborator,
};
use super::guardrails::GuardrailConfig;
use super::input;
use super::state::{Argument, Article, DebatePhase, DebateState, EndReason, Position};
use super::turn::{TurnCoordinator, TurnDecision};

/// Feedback attached to the sentinel when the iteration bound aborts generation.
pub const SAFETY_ABORT_FEEDBACK: &str = "Debate terminated due to safety limits";

/// Configuration for the debate engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub guardrails: GuardrailConfig,
    pub retry: RetryPolicy,
    /// Summarize and stop. Diagnostic configuration only.
    #[serde(default)]
    pub analyze_only: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.guardrails.validate()?;
        self.retry.validate()?;
        Ok(())
    }
}

/// How a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Waiting at `AwaitingUserInput`; apply input and run again.
    Suspended,
    /// The debate reached `Ended`.
    Ended,
}

/// Result of one [`DebateEngine::run`] call.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: DebateState,
    pub outcome: RunOutcome,
    /// Set when the iteration bound replaced a generation with a placeholder.
    pub sentinel: Option<Argument>,
}

impl RunReport {
    /// Whether this run ended because of the iteration safety bound.
    pub fn safety_abort(&self) -> bool {
        self.sentinel.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.outcome == RunOutcome::Suspended
    }
}

// ── Transition payloads ─────────────────────────────────────────────

/// A draft argument travelling through verification and revision.
#[derive(Debug, Clone)]
struct Draft {
    argument: Argument,
    /// Revisions already applied to this draft.
    revisions: u32,
}

/// What reaches fact checking and processing.
#[derive(Debug, Clone)]
enum Candidate {
    Draft(Draft),
    Terminated(Argument),
}

/// The step about to execute, carrying exactly the data it consumes.
#[derive(Debug)]
enum Step {
    Analyze,
    Generate(Position),
    FactCheck(Candidate),
    Revise { draft: Draft, feedback: String },
    Process(Candidate),
    AwaitInput,
    CheckStatus,
}

/// Working state of a single run.
struct Run {
    state: DebateState,
    sentinel: Option<Argument>,
}

impl Run {
    fn transition(&mut self, to: DebatePhase, reason: Option<String>) -> DebateResult<()> {
        let from = self.state.phase;
        if !from.valid_transitions().contains(&to) {
            return Err(DebateError::invalid(format!(
                "illegal transition {from} -> {to}"
            )));
        }
        debug!(
            %from,
            %to,
            iteration = self.state.iteration_count,
            reason = reason.as_deref().unwrap_or(""),
            "Debate transition"
        );
        self.state.record_transition(to, reason);
        Ok(())
    }

    fn finish(self, outcome: RunOutcome) -> RunReport {
        RunReport {
            state: self.state,
            outcome,
            sentinel: self.sentinel,
        }
    }
}

/// The debate state machine.
///
/// Collaborators are injected at construction; the engine itself holds no
/// per-debate state, so one engine can serve many debates concurrently.
pub struct DebateEngine {
    generator: Arc<dyn GenerationCollaborator>,
    verifier: Arc<dyn VerificationCollaborator>,
    config: EngineConfig,
}

impl DebateEngine {
    pub fn new(
        generator: Arc<dyn GenerationCollaborator>,
        verifier: Arc<dyn VerificationCollaborator>,
    ) -> Self {
        Self::with_config(generator, verifier, EngineConfig::default())
    }

    pub fn with_config(
        generator: Arc<dyn GenerationCollaborator>,
        verifier: Arc<dyn VerificationCollaborator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            generator,
            verifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fresh debate state for an article.
    pub fn initialize(&self, article: Article) -> DebateState {
        DebateState::new(article)
    }

    /// Apply one line of user input between runs.
    pub fn apply_user_input(&self, state: &DebateState, text: &str) -> DebateResult<DebateState> {
        input::apply_user_input(state, text)
    }

    /// Run until the debate suspends at `AwaitingUserInput` or ends.
    pub async fn run(&self, state: &DebateState) -> DebateResult<RunReport> {
        self.check_entry(state)?;

        let mut run = Run {
            state: state.clone(),
            sentinel: None,
        };

        let mut step = match state.phase {
            DebatePhase::Ended => return Ok(run.finish(RunOutcome::Ended)),
            DebatePhase::Analyzing => Step::Analyze,
            DebatePhase::AwaitingUserInput => {
                run.transition(DebatePhase::CheckingStatus, Some("resumed".into()))?;
                Step::CheckStatus
            }
            other => {
                return Err(DebateError::invalid(format!(
                    "cannot start a run from phase {other}"
                )))
            }
        };

        info!(
            title = %state.article.title,
            phase = %state.phase,
            iteration = state.iteration_count,
            "Debate run started"
        );

        loop {
            step = match step {
                Step::Analyze => match self.analyze(&mut run).await? {
                    Some(next) => next,
                    None => break,
                },
                Step::Generate(position) => self.generate(&mut run, position).await?,
                Step::FactCheck(candidate) => self.fact_check(&mut run, candidate).await?,
                Step::Revise { draft, feedback } => self.revise(&mut run, draft, feedback).await?,
                Step::Process(candidate) => self.process(&mut run, candidate)?,
                Step::AwaitInput => {
                    if run.state.is_active {
                        info!(
                            iteration = run.state.iteration_count,
                            next_turn = %run.state.current_turn,
                            arguments = run.state.arguments.len(),
                            "Debate suspended for user input"
                        );
                        return Ok(run.finish(RunOutcome::Suspended));
                    }
                    run.transition(DebatePhase::CheckingStatus, None)?;
                    Step::CheckStatus
                }
                Step::CheckStatus => match self.check_status(&mut run)? {
                    Some(next) => next,
                    None => break,
                },
            };
        }

        info!(
            end_reason = %run.state.end_reason.map(|r| r.to_string()).unwrap_or_default(),
            arguments = run.state.arguments.len(),
            iteration = run.state.iteration_count,
            safety_abort = run.sentinel.is_some(),
            "Debate ended"
        );
        Ok(run.finish(RunOutcome::Ended))
    }

    fn check_entry(&self, state: &DebateState) -> DebateResult<()> {
        let violations = state.invariant_violations();
        if !violations.is_empty() {
            return Err(DebateError::invalid(violations.join("; ")));
        }
        if state.iteration_count > self.config.guardrails.max_iterations {
            return Err(DebateError::invalid(format!(
                "iteration_count {} exceeds the bound of {}",
                state.iteration_count, self.config.guardrails.max_iterations
            )));
        }
        Ok(())
    }

    // ── Steps ───────────────────────────────────────────────────────

    async fn analyze(&self, run: &mut Run) -> DebateResult<Option<Step>> {
        if !run.state.is_active {
            run.transition(DebatePhase::Ended, Some("inactive before analysis".into()))?;
            return Ok(None);
        }

        let generator = &self.generator;
        let article = &run.state.article;
        let summary = retry::invoke(Collaborator::Summarizer, &self.config.retry, move || async move {
            non_empty(generator.summarize(article).await?, "summary")
        })
        .await?;

        run.state.summary = Some(summary);
        run.state.iteration_count = 0;

        if self.config.analyze_only {
            run.state.iteration_count = 1;
            run.state.deactivate(EndReason::AnalysisOnly);
            run.transition(DebatePhase::Ended, Some(EndReason::AnalysisOnly.to_string()))?;
            return Ok(None);
        }

        run.transition(DebatePhase::GeneratingPro, None)?;
        Ok(Some(Step::Generate(Position::Pro)))
    }

    async fn generate(&self, run: &mut Run, position: Position) -> DebateResult<Step> {
        if position != run.state.current_turn {
            return Err(DebateError::invalid(format!(
                "generation requested for {position} but it is {}'s turn",
                run.state.current_turn
            )));
        }
        let summary = run
            .state
            .summary
            .clone()
            .ok_or_else(|| DebateError::invalid("generation reached without a summary"))?;

        let guard = self.config.guardrails.check_iterations(&run.state);
        if guard.should_stop() {
            warn!(%position, %guard, "Iteration bound reached, substituting terminated argument");
            run.state.deactivate(EndReason::IterationLimit);
            let sentinel = Argument::terminated(position);
            run.transition(DebatePhase::FactChecking, Some(guard.to_string()))?;
            return Ok(Step::FactCheck(Candidate::Terminated(sentinel)));
        }

        let request = ArgumentRequest {
            position,
            summary,
            previous: run.state.recent_arguments().to_vec(),
            user_input: run.state.latest_user_input().to_string(),
            number: run.state.next_number(position),
        };

        let generator = &self.generator;
        let req = &request;
        let content = retry::invoke(Collaborator::Writer, &self.config.retry, move || async move {
            non_empty(generator.generate_argument(req).await?, "argument")
        })
        .await?;

        run.state.iteration_count += 1;
        let argument = Argument::draft(content, position, request.number);
        info!(
            %position,
            number = argument.number,
            iteration = run.state.iteration_count,
            "Argument drafted"
        );
        run.transition(DebatePhase::FactChecking, None)?;
        Ok(Step::FactCheck(Candidate::Draft(Draft {
            argument,
            revisions: 0,
        })))
    }

    async fn fact_check(&self, run: &mut Run, candidate: Candidate) -> DebateResult<Step> {
        let mut draft = match candidate {
            Candidate::Terminated(sentinel) => {
                run.transition(DebatePhase::Processing, Some(SAFETY_ABORT_FEEDBACK.into()))?;
                return Ok(Step::Process(Candidate::Terminated(sentinel)));
            }
            Candidate::Draft(draft) => draft,
        };

        let verifier = &self.verifier;
        let content = draft.argument.content.as_str();
        let verdict = retry::invoke(Collaborator::Verifier, &self.config.retry, move || {
            verifier.verify(content)
        })
        .await?;

        draft.argument.verified = verdict.verified;
        let position = draft.argument.position;
        debug!(
            %position,
            number = draft.argument.number,
            verified = verdict.verified,
            revisions = draft.revisions,
            "Fact check complete"
        );

        if verdict.verified {
            run.transition(DebatePhase::Processing, None)?;
            return Ok(Step::Process(Candidate::Draft(draft)));
        }

        let guard = self.config.guardrails.check_revisions(draft.revisions);
        if guard.should_stop() {
            warn!(
                %position,
                number = draft.argument.number,
                %guard,
                "Revision budget spent, discarding draft"
            );
            run.transition(DebatePhase::generating(position), Some(guard.to_string()))?;
            return Ok(Step::Generate(position));
        }

        run.transition(DebatePhase::Revising, None)?;
        Ok(Step::Revise {
            draft,
            feedback: verdict.feedback,
        })
    }

    async fn revise(&self, run: &mut Run, mut draft: Draft, feedback: String) -> DebateResult<Step> {
        let request = RevisionRequest {
            position: draft.argument.position,
            original: draft.argument.content.clone(),
            feedback,
        };

        let generator = &self.generator;
        let req = &request;
        let revised = retry::invoke(Collaborator::Reviser, &self.config.retry, move || async move {
            non_empty(generator.revise_argument(req).await?, "revision")
        })
        .await?;

        draft.argument.content = revised;
        draft.revisions += 1;
        run.transition(DebatePhase::FactChecking, Some(format!("revision {}", draft.revisions)))?;
        Ok(Step::FactCheck(Candidate::Draft(draft)))
    }

    fn process(&self, run: &mut Run, candidate: Candidate) -> DebateResult<Step> {
        match candidate {
            Candidate::Terminated(sentinel) => {
                run.sentinel = Some(sentinel);
                run.transition(
                    DebatePhase::AwaitingUserInput,
                    Some("terminated argument not recorded".into()),
                )?;
            }
            Candidate::Draft(Draft { argument, .. }) => {
                if !argument.verified {
                    return Err(DebateError::invalid(format!(
                        "unverified {} argument #{} reached processing",
                        argument.position, argument.number
                    )));
                }
                if argument.position != run.state.current_turn {
                    return Err(DebateError::invalid(format!(
                        "{} argument processed on {}'s turn",
                        argument.position, run.state.current_turn
                    )));
                }
                let expected = run.state.next_number(argument.position);
                if argument.number != expected {
                    return Err(DebateError::invalid(format!(
                        "{} argument numbered {} but {} was expected",
                        argument.position, argument.number, expected
                    )));
                }
                info!(
                    position = %argument.position,
                    number = argument.number,
                    "Argument verified and recorded"
                );
                run.state.commit_argument(argument);
                run.transition(DebatePhase::AwaitingUserInput, None)?;
            }
        }
        Ok(Step::AwaitInput)
    }

    fn check_status(&self, run: &mut Run) -> DebateResult<Option<Step>> {
        let coordinator = TurnCoordinator::new(&self.config.guardrails);
        match coordinator.decide(&run.state) {
            TurnDecision::End(reason) => {
                run.state.deactivate(reason);
                run.transition(DebatePhase::Ended, Some(reason.to_string()))?;
                Ok(None)
            }
            TurnDecision::Generate(position) => {
                run.transition(DebatePhase::generating(position), None)?;
                Ok(Some(Step::Generate(position)))
            }
        }
    }
}

/// Empty collaborator output is treated as an unparseable response.
fn non_empty(text: String, what: &str) -> Result<String, CollaboratorError> {
    if text.trim().is_empty() {
        Err(CollaboratorError::Parse(format!("empty {what}")))
    } else {
        Ok(text)
    }
}
