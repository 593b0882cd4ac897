//! Fact checker agent and its judge adapter.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::debug;

use orchestration::debate::{Evidence, FactJudge};
use orchestration::CollaboratorError;

use crate::prompts;

use super::{classify_prompt_error, OaiAgent};

/// Build the fact checker. Low temperature; must answer PASSES or FAILS.
pub fn build_fact_checker(
    client: &openai::CompletionsClient,
    model: &str,
    temperature: f64,
) -> OaiAgent {
    client
        .agent(model)
        .name("fact_checker")
        .description("Judges factual accuracy of an argument. States PASSES or FAILS.")
        .preamble(prompts::FACT_CHECKER_PREAMBLE)
        .temperature(temperature)
        .build()
}

/// [`FactJudge`] backed by the fact checker agent.
pub struct RigFactJudge {
    agent: OaiAgent,
}

impl RigFactJudge {
    pub fn new(agent: OaiAgent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl FactJudge for RigFactJudge {
    async fn judge(&self, content: &str, evidence: &Evidence) -> Result<String, CollaboratorError> {
        let prompt = prompts::fact_check_prompt(content, evidence);
        let judgment: String = self
            .agent
            .prompt(prompt.as_str())
            .await
            .map_err(classify_prompt_error)?;
        debug!(
            degraded_evidence = evidence.is_degraded(),
            claims = evidence.claims.len(),
            prompt_version = prompts::PROMPT_VERSION,
            "Fact check judgment received"
        );
        Ok(judgment)
    }
}
