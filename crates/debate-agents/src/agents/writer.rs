//! Pro and con writer agents.

use rig::client::CompletionClient;
use rig::providers::openai;

use orchestration::debate::Position;

use crate::prompts;

use super::OaiAgent;

/// Build the writer for one side. The same agent revises its own drafts.
pub fn build_writer(
    client: &openai::CompletionsClient,
    model: &str,
    position: Position,
    temperature: f64,
) -> OaiAgent {
    client
        .agent(model)
        .name(match position {
            Position::Pro => "pro_writer",
            Position::Con => "con_writer",
        })
        .description("Writes and revises fact-checkable debate arguments for one side.")
        .preamble(prompts::WRITER_PREAMBLE)
        .temperature(temperature)
        .build()
}
