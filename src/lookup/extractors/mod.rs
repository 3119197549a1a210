// TitleExtractor backends
//
// - CLI mode: native `yt-dlp` binary (fast, no Python dependency)
// - Python mode: `python3 -m yt_dlp` (better against bot detection)
// - oEmbed mode: public metadata endpoint over HTTP (no process at all)
//
// Strategies pick a backend by kind; the orchestrator never names one.

mod cli;
pub mod diagnostics;
mod oembed;
mod python;
mod traits;

pub use cli::CliTitleExtractor;
pub use diagnostics::{diagnose_error, BlockingReason};
pub use oembed::{OEmbedTitleExtractor, DEFAULT_OEMBED_ENDPOINT};
pub use python::PythonTitleExtractor;
pub use traits::TitleExtractor;
