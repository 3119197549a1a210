// CLI TitleExtractor - uses native `yt-dlp` binary
//
// Fastest option and needs no Python, but more likely to trip bot
// detection than the module-based extractor.

use async_trait::async_trait;
use tracing::debug;

use super::traits::TitleExtractor;
use crate::lookup::errors::ExtractError;
use crate::lookup::strategy::InvocationSpec;
use crate::lookup::tools;
use crate::lookup::utils::{normalize_title, run_captured, truncate_diagnostic};

/// CLI-based title extractor using yt-dlp binary
pub struct CliTitleExtractor {
    ytdlp_path: String,
    max_diagnostic_len: usize,
}

impl CliTitleExtractor {
    /// Use `ytdlp_path` when given, otherwise search the usual install locations
    pub fn new(ytdlp_path: Option<String>, max_diagnostic_len: usize) -> Self {
        Self {
            ytdlp_path: ytdlp_path
                .or_else(|| tools::find_binary("yt-dlp"))
                .unwrap_or_else(|| "yt-dlp".to_string()),
            max_diagnostic_len,
        }
    }
}

/// Shared by the CLI and python extractors: exit status + stdout -> title
pub(super) fn title_from_output(
    output: std::process::Output,
    max_diagnostic_len: usize,
) -> Result<String, ExtractError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr.to_string()
        };
        let detail = truncate_diagnostic(&detail, max_diagnostic_len);
        return Err(ExtractError::Execution(detail));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    normalize_title(&stdout).ok_or(ExtractError::EmptyTitle)
}

#[async_trait]
impl TitleExtractor for CliTitleExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    async fn is_available(&self) -> bool {
        tools::tool_version(&self.ytdlp_path, &["--version"]).await.is_some()
    }

    async fn extract_title(&self, invocation: &InvocationSpec) -> Result<String, ExtractError> {
        debug!(
            strategy = %invocation.strategy,
            "running {} {}",
            self.ytdlp_path,
            invocation.args.join(" ")
        );

        let output = run_captured(&self.ytdlp_path, &invocation.args).await?;
        title_from_output(output, self.max_diagnostic_len)
    }
}
