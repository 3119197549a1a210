// External tool discovery for the yt-dlp binary

use std::process::Command;

use super::utils::run_captured;

/// Locate a binary: common install paths first, then `which`
pub fn find_binary(binary_name: &str) -> Option<String> {
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name), // Homebrew on Apple Silicon
        format!("/usr/local/bin/{}", binary_name),    // Homebrew on Intel / pip --user
        format!("/usr/bin/{}", binary_name),          // System installation
    ];

    for path in common_paths {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }

    if let Ok(output) = Command::new("which").arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return Some(path);
            }
        }
    }

    None
}

/// Output of `<program> --version`, if it runs cleanly.
///
/// The child is killed if this future is dropped.
pub async fn tool_version(program: &str, version_args: &[&str]) -> Option<String> {
    let args: Vec<String> = version_args.iter().map(|a| a.to_string()).collect();
    match run_captured(program, &args).await {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!out.is_empty()).then_some(out)
        }
        _ => None,
    }
}
