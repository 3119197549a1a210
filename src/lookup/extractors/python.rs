// Python TitleExtractor - uses `python3 -m yt_dlp`
//
// Slower to start than the binary but tends to fare better against bot
// detection, and works where only the pip package is installed.

use async_trait::async_trait;
use tracing::debug;

use super::cli::title_from_output;
use super::traits::TitleExtractor;
use crate::lookup::errors::ExtractError;
use crate::lookup::strategy::InvocationSpec;
use crate::lookup::utils::run_captured;

/// Python-based title extractor using the yt_dlp module
pub struct PythonTitleExtractor {
    python_cmd: String,
    max_diagnostic_len: usize,
}

impl PythonTitleExtractor {
    pub fn new(python_cmd: impl Into<String>, max_diagnostic_len: usize) -> Self {
        Self {
            python_cmd: python_cmd.into(),
            max_diagnostic_len,
        }
    }

    fn build_args(invocation: &InvocationSpec) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "yt_dlp".to_string()];
        args.extend(invocation.args.iter().cloned());
        args
    }
}

#[async_trait]
impl TitleExtractor for PythonTitleExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
    }

    /// Check if yt_dlp module is installed
    async fn is_available(&self) -> bool {
        let args = ["-c".to_string(), "import yt_dlp".to_string()];
        run_captured(&self.python_cmd, &args)
            .await
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    async fn extract_title(&self, invocation: &InvocationSpec) -> Result<String, ExtractError> {
        let args = Self::build_args(invocation);
        debug!(strategy = %invocation.strategy, "running {} {}", self.python_cmd, args.join(" "));

        let output = run_captured(&self.python_cmd, &args).await?;
        title_from_output(output, self.max_diagnostic_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::strategy::{default_strategies, InvocationEnv};

    #[test]
    fn test_args_prefix_module() {
        let spec = default_strategies()[0]
            .build_invocation("https://youtu.be/abc", &InvocationEnv::default())
            .unwrap();
        let args = PythonTitleExtractor::build_args(&spec);
        assert_eq!(&args[..2], ["-m", "yt_dlp"]);
        assert_eq!(&args[2..], spec.args.as_slice());
    }
}
