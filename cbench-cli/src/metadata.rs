//! Run Metadata
//!
//! Git information recorded with every run. Falls back to `"unknown"`
//! outside a repository or when git is not installed.

use std::path::Path;

/// Placeholder when the commit cannot be determined
pub const UNKNOWN_HASH: &str = "unknown";

fn git(args: &[&str], dir: Option<&Path>) -> Option<String> {
    let mut cmd = std::process::Command::new("git");
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    let output = cmd.output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Commit hash of `HEAD` in the current directory
pub fn current_git_hash() -> String {
    git_hash_in(None)
}

/// Commit hash of `HEAD` in `dir`, or the current directory
pub fn git_hash_in(dir: Option<&Path>) -> String {
    git(&["rev-parse", "HEAD"], dir).unwrap_or_else(|| {
        tracing::debug!("git hash unavailable, using {:?}", UNKNOWN_HASH);
        UNKNOWN_HASH.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_a_repository_is_unknown() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(git_hash_in(Some(tmp.path())), UNKNOWN_HASH);
    }

    #[test]
    fn hash_is_never_empty() {
        assert!(!current_git_hash().is_empty());
    }
}
