//! Agent builders for the debate.
//!
//! Each agent is built via a free function that returns
//! `Agent<openai::completion::CompletionModel>`. The `AgentFactory` ties them
//! together into the collaborators the debate engine expects.

pub mod fact_checker;
pub mod reader;
pub mod writer;

use std::fmt::Display;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rig::agent::Agent;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::{debug, warn};

use orchestration::debate::{
    ArgumentRequest, Article, EvidenceLookup, FactCheckVerifier, GenerationCollaborator,
    NoEvidence, Position, RevisionRequest,
};
use orchestration::{CollaboratorError, DebateEngine};

use crate::config::AgentsConfig;
use crate::evidence::GoogleFactCheckClient;
use crate::prompts;

/// Type alias for agents built from OpenAI-compatible endpoints.
pub type OaiAgent = Agent<openai::completion::CompletionModel>;

/// Map a provider error onto the collaborator taxonomy.
///
/// Auth failures are not retriable; rate limits and everything else are.
pub fn classify_prompt_error(err: impl Display) -> CollaboratorError {
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if msg.contains("429") || lower.contains("rate limit") {
        CollaboratorError::RateLimited(msg)
    } else if msg.contains("401")
        || msg.contains("403")
        || lower.contains("invalid api key")
        || lower.contains("unauthorized")
    {
        CollaboratorError::Unavailable(msg)
    } else if lower.contains("jsonerror") || lower.contains("deserializ") {
        CollaboratorError::Parse(msg)
    } else {
        CollaboratorError::Inference(msg)
    }
}

/// Reader plus one writer per side, exposed as a [`GenerationCollaborator`].
pub struct DebateAgents {
    reader: OaiAgent,
    pro_writer: OaiAgent,
    con_writer: OaiAgent,
}

impl DebateAgents {
    fn writer(&self, position: Position) -> &OaiAgent {
        match position {
            Position::Pro => &self.pro_writer,
            Position::Con => &self.con_writer,
        }
    }
}

async fn ask(agent: &OaiAgent, role: &str, prompt: String) -> Result<String, CollaboratorError> {
    debug!(role, prompt_version = prompts::PROMPT_VERSION, "Prompting agent");
    agent
        .prompt(prompt.as_str())
        .await
        .map_err(classify_prompt_error)
}

#[async_trait]
impl GenerationCollaborator for DebateAgents {
    async fn summarize(&self, article: &Article) -> Result<String, CollaboratorError> {
        ask(&self.reader, "reader", prompts::summary_prompt(article)).await
    }

    async fn generate_argument(
        &self,
        request: &ArgumentRequest,
    ) -> Result<String, CollaboratorError> {
        let role = format!("{}_writer", request.position);
        ask(
            self.writer(request.position),
            &role,
            prompts::argument_prompt(request),
        )
        .await
    }

    async fn revise_argument(
        &self,
        request: &RevisionRequest,
    ) -> Result<String, CollaboratorError> {
        let role = format!("{}_reviser", request.position);
        ask(
            self.writer(request.position),
            &role,
            prompts::revision_prompt(request),
        )
        .await
    }
}

/// Factory that builds all debate agents from an `AgentsConfig`.
pub struct AgentFactory {
    pub client: openai::CompletionsClient,
    pub config: AgentsConfig,
}

impl AgentFactory {
    pub fn new(config: &AgentsConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn build_generation(&self) -> DebateAgents {
        let model = &self.config.endpoint.model;
        let temperature = self.config.writer_temperature;
        DebateAgents {
            reader: reader::build_reader(&self.client, model),
            pro_writer: writer::build_writer(&self.client, model, Position::Pro, temperature),
            con_writer: writer::build_writer(&self.client, model, Position::Con, temperature),
        }
    }

    /// Google Fact Check lookup when a key is configured, otherwise none.
    pub fn build_evidence_lookup(&self) -> Result<Arc<dyn EvidenceLookup>> {
        Ok(match &self.config.fact_check_api_key {
            Some(key) => Arc::new(GoogleFactCheckClient::new(
                &self.config.fact_check_url,
                key,
                self.config.lookup_timeout,
            )?),
            None => {
                warn!("GOOGLE_FACT_CHECK_API_KEY not set, fact checks run without evidence");
                Arc::new(NoEvidence)
            }
        })
    }

    pub fn build_verifier(&self) -> Result<FactCheckVerifier> {
        let agent = fact_checker::build_fact_checker(
            &self.client,
            &self.config.endpoint.model,
            self.config.fact_checker_temperature,
        );
        Ok(FactCheckVerifier::new(
            Arc::new(fact_checker::RigFactJudge::new(agent)),
            self.build_evidence_lookup()?,
        )
        .with_lookup_timeout(self.config.lookup_timeout))
    }

    /// Wire the engine with LLM-backed collaborators.
    pub fn build_engine(&self) -> Result<DebateEngine> {
        Ok(DebateEngine::with_config(
            Arc::new(self.build_generation()),
            Arc::new(self.build_verifier()?),
            self.config.engine_config(),
        ))
    }
}
