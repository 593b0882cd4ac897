//! Interactive terminal debate: print each verified argument, read the next
//! instruction, resume.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::warn;

use orchestration::debate::{CheckpointManager, DebateEngine, DebateState, RunOutcome};

/// Where to write a checkpoint after every run.
pub struct CheckpointTarget {
    pub manager: CheckpointManager,
    pub path: PathBuf,
}

const INPUT_PROMPT: &str =
    "\nYour input (an instruction for the next writer, 'continue', or 'done'): ";

/// Drive a debate from the terminal until it ends.
///
/// End of input is treated as `done`. Returns the final state.
pub async fn run_interactive<R, W>(
    engine: &DebateEngine,
    mut state: DebateState,
    mut input: R,
    out: &mut W,
    mut checkpoint: Option<CheckpointTarget>,
) -> Result<DebateState>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "=== {} ===", state.article.title)?;
    let mut summary_shown = false;
    let mut printed = 0;

    loop {
        if !summary_shown {
            if let Some(summary) = &state.summary {
                writeln!(out, "\nSUMMARY:\n\n{summary}")?;
                summary_shown = true;
            }
        }
        for argument in &state.arguments[printed..] {
            writeln!(out, "\n{}", argument.render())?;
        }
        printed = state.arguments.len();

        if state.phase.is_terminal() {
            break;
        }

        if state.is_waiting_for_user() {
            write!(out, "{INPUT_PROMPT}")?;
            out.flush()?;
            let mut line = String::new();
            let read = input
                .read_line(&mut line)
                .await
                .context("Failed to read user input")?;
            let line = if read == 0 { "done".to_string() } else { line };
            state = engine.apply_user_input(&state, line.trim_end_matches(['\r', '\n']))?;
        }

        let report = engine.run(&state).await?;
        if let Some(sentinel) = &report.sentinel {
            writeln!(out, "\n[{}]", sentinel.content)?;
        }
        state = report.state;

        if let Some(target) = checkpoint.as_mut() {
            let reason = match report.outcome {
                RunOutcome::Suspended => "suspended",
                RunOutcome::Ended => "ended",
            };
            if let Err(e) = target.manager.save(&state, reason, &target.path) {
                warn!(error = %e, "Failed to write checkpoint");
            }
        }
    }

    let reason = state
        .end_reason
        .map(|r| r.to_string())
        .unwrap_or_else(|| "ended".to_string());
    writeln!(
        out,
        "\nDebate over ({reason}): {} pro and {} con arguments.",
        state.pro_count, state.con_count
    )?;
    Ok(state)
}
