//! Prompt constants and builders for each debate agent role.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever preamble or template
//! wording changes, so logged responses can be traced to the prompt that
//! produced them.

use orchestration::debate::{Argument, ArgumentRequest, Article, Evidence, RevisionRequest};

/// Prompt version. Bump on any wording change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Reader (summarizer) preamble.
pub const READER_PREAMBLE: &str = "\
You are a reader agent tasked with analyzing news and opinion articles for a \
structured debate. Be objective and thorough in your analysis.";

/// Writer preamble. The side and stance are given in every prompt.
pub const WRITER_PREAMBLE: &str = "\
You are a writer agent in a debate about an article. You argue one side only. \
Focus on facts and logical reasoning. Make specific claims that can be fact-checked.";

/// Fact checker preamble.
pub const FACT_CHECKER_PREAMBLE: &str = "\
You are a fact checker agent evaluating arguments in a debate. You are strict \
about factual accuracy and never invent sources.";

/// Shown to a writer when no argument has been made yet.
pub const NO_PREVIOUS_ARGUMENTS: &str = "No previous arguments.";

/// Shown to a writer when the user gave no instruction.
pub const NO_USER_INPUT: &str = "No user input provided.";

pub fn summary_prompt(article: &Article) -> String {
    let source = article
        .source
        .as_deref()
        .map(|s| format!("Article Source: {s}\n"))
        .unwrap_or_default();
    format!(
        "Article Title: {title}\n\
         {source}\
         Article Content: {content}\n\n\
         Please provide:\n\
         1. A concise summary of the article\n\
         2. The main position/stance of the article\n\
         3. Key claims and evidence presented\n\
         4. Potential counterarguments",
        title = article.title,
        content = article.content,
    )
}

/// Previous arguments as writer context, one block per argument.
pub fn previous_arguments_text(previous: &[Argument]) -> String {
    if previous.is_empty() {
        return NO_PREVIOUS_ARGUMENTS.to_string();
    }
    previous
        .iter()
        .map(Argument::context_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn argument_prompt(request: &ArgumentRequest) -> String {
    let user_input = if request.user_input.trim().is_empty() {
        NO_USER_INPUT
    } else {
        request.user_input.as_str()
    };
    format!(
        "You are the {position} writer.\n\n\
         Article Summary: {summary}\n\n\
         Previous Arguments:\n{previous}\n\n\
         User Input: {user_input}\n\n\
         Your task is to write argument #{number} {stance} the article's position.\n\
         Write a concise, well-structured argument of 3-5 paragraphs.",
        position = request.position,
        summary = request.summary,
        previous = previous_arguments_text(&request.previous),
        number = request.number,
        stance = request.position.stance(),
    )
}

pub fn revision_prompt(request: &RevisionRequest) -> String {
    format!(
        "You need to revise your argument based on fact-checking feedback.\n\n\
         Your original argument:\n{original}\n\n\
         Fact-checking feedback:\n{feedback}\n\n\
         Please revise your argument to address these issues while maintaining \
         your {position} position. Focus on accuracy while keeping your argument \
         persuasive. Reply with the revised argument only.",
        original = request.original,
        feedback = request.feedback,
        position = request.position,
    )
}

pub fn fact_check_prompt(content: &str, evidence: &Evidence) -> String {
    format!(
        "Argument: {content}\n\n\
         Fact Check API results:\n{evidence}\n\n\
         Your task is to:\n\
         1. Identify any factual claims in the argument\n\
         2. Determine if these claims are supported by reliable evidence\n\
         3. Check if any claims contradict established facts\n\n\
         Provide a detailed assessment of the argument's factual accuracy.\n\
         Clearly state whether the argument PASSES or FAILS fact checking.\n\
         If it FAILS, explain what needs to be corrected.",
        evidence = evidence.to_prompt_text(),
    )
}
