//! # zfpack Copy Exclusions
//!
//! File: cli/src/common/fs/exclude.rs
//!
//! ## Overview
//!
//! Computes the set of paths the tree copy must skip for one directory level.
//! The set combines the paths supplied by the caller with the patterns listed
//! in a `.gitignore` file found directly inside the directory being copied.
//!
//! ## Pattern Handling
//!
//! Each `.gitignore` line is trimmed. Blank lines and `#` comments are skipped,
//! and leading or trailing `/` characters are removed. A pattern that names an
//! existing file or directory relative to the source is excluded literally;
//! anything else is expanded with `glob` relative to the source directory.
//! Negation (`!pattern`) and `**` anchoring are not interpreted.
//!
use glob::{glob_with, MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the ignore file honored by the tree copy.
pub const GITIGNORE_FILENAME: &str = ".gitignore";

/// Absolute paths excluded from a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    paths: BTreeSet<PathBuf>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>) {
        self.paths.insert(path.into());
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Builds the exclusions for copying `source`: the caller's paths plus, when
/// `use_gitignore` is set, everything matched by `source/.gitignore`.
pub fn compute_exclusions(
    source: &Path,
    caller: &ExclusionSet,
    use_gitignore: bool,
) -> ExclusionSet {
    let mut result = caller.clone();
    if !use_gitignore {
        return result;
    }

    let gitignore = source.join(GITIGNORE_FILENAME);
    if !gitignore.is_file() {
        return result;
    }

    let content = match fs::read_to_string(&gitignore) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read {:?}, ignoring it: {}", gitignore, e);
            return result;
        }
    };

    for pattern in content.lines().filter_map(normalize_pattern) {
        let literal = source.join(pattern);
        if literal.exists() {
            result.insert(literal);
            continue;
        }
        for matched in expand_pattern(source, pattern) {
            result.insert(matched);
        }
    }

    debug!(
        "Computed {} exclusions for {:?} ({} from caller)",
        result.len(),
        source,
        caller.len()
    );
    result
}

/// Trims a `.gitignore` line; `None` for blanks and comments.
fn normalize_pattern(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let pattern = line.trim_matches('/');
    if pattern.is_empty() {
        None
    } else {
        Some(pattern)
    }
}

fn expand_pattern(source: &Path, pattern: &str) -> Vec<PathBuf> {
    let base = Pattern::escape(&source.to_string_lossy());
    let full = format!("{}/{}", base, pattern);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    match glob_with(&full, options) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            warn!("Skipping invalid ignore pattern '{}': {}", pattern, e);
            Vec::new()
        }
    }
}
