//! Reader agent: summarizes the article for the writers.

use rig::client::CompletionClient;
use rig::providers::openai;

use crate::prompts;

use super::OaiAgent;

/// Build the reader agent. No tools; one summary per article.
pub fn build_reader(client: &openai::CompletionsClient, model: &str) -> OaiAgent {
    client
        .agent(model)
        .name("reader")
        .description("Summarizes an article: stance, key claims, counterarguments.")
        .preamble(prompts::READER_PREAMBLE)
        .temperature(0.3)
        .build()
}
