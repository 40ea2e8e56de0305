//! Repository identity from the local git checkout.

use std::path::Path;
use std::process::Command;

/// `owner/repo` from the origin remote, or `unknown/repo`.
pub fn repository_name(dir: &Path) -> String {
    git_output(dir, &["config", "--get", "remote.origin.url"])
        .and_then(|url| parse_repository(&url))
        .unwrap_or_else(|| "unknown/repo".to_string())
}

/// Abbreviated HEAD commit, or `unknown`.
pub fn commit_hash(dir: &Path) -> String {
    git_output(dir, &["rev-parse", "HEAD"])
        .map(|hash| hash.chars().take(7).collect())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Segment after `github.com` with separators and `.git` trimmed.
fn parse_repository(url: &str) -> Option<String> {
    let (_, tail) = url.rsplit_once("github.com")?;
    let name = tail.trim_matches(|c| c == '/' || c == ':').replace(".git", "");
    (!name.is_empty()).then_some(name)
}

fn git_output(dir: &Path, args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            } else {
                None
            }
        })
}
