// Helper functions shared by extractor backends

use std::io;
use std::process::{Output, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;

use super::errors::ExtractError;

/// Run a command to completion, capturing stdout and stderr.
///
/// No deadline is applied here: the caller owns the deadline and cancels by
/// dropping this future. The child is spawned with `kill_on_drop`, and both
/// pipes are drained inside the same future, so a drop kills the process and
/// releases its handles.
pub async fn run_captured(program: &str, args: &[String]) -> Result<Output, ExtractError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ExtractError::ToolNotFound(program.to_string()),
            _ => ExtractError::Execution(format!("Failed to start {}: {}", program, e)),
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| {
            ExtractError::Execution(format!("Failed to capture stdout from {}", program))
        })?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| {
            ExtractError::Execution(format!("Failed to capture stderr from {}", program))
        })?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let (status, stdout_res, stderr_res) = tokio::join!(
        child.wait(),
        stdout_pipe.read_to_end(&mut stdout),
        stderr_pipe.read_to_end(&mut stderr),
    );

    let status = status.map_err(|e| {
        ExtractError::Execution(format!("Failed to wait for {}: {}", program, e))
    })?;
    stdout_res
        .map_err(|e| ExtractError::Execution(format!("Failed to read stdout: {}", e)))?;
    stderr_res
        .map_err(|e| ExtractError::Execution(format!("Failed to read stderr: {}", e)))?;

    Ok(Output {
        status,
        stdout,
        stderr,
    })
}

/// First non-empty output line with whitespace runs collapsed
pub fn normalize_title(raw: &str) -> Option<String> {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|line| !line.is_empty())
}

/// Trim and cap diagnostic text at `max_chars` characters
pub fn truncate_diagnostic(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(max_chars).collect();
    out.push('…');
    out
}
