//! # Application Descriptor (`build::application`)
//!
//! File: cli/src/commands/build/application.rs
//!
//! ## Overview
//!
//! Reads and rewrites `config/application.config.php`, the file that makes a
//! directory a packageable Zend Framework application. Only the array bound to
//! the `'modules'` key is interpreted; the rest of the PHP file is opaque text.
//!
//! ## Parsing
//!
//! A regex locates `'modules' => array(` or `'modules' => [`. From there a small
//! scanner walks to the matching closing bracket, skipping comments and nested
//! brackets, and records every string literal at the top level of the list.
//! Both quoting styles are accepted; `\\` and the escaped quote character are
//! unescaped, other backslashes are kept (`'ZF\Apigility'` is `ZF\Apigility`).
//!
//! ## Rewriting
//!
//! `rewrite_modules` keeps the original text of the surviving entries and the
//! separators that follow them, so bracket style, quoting, indentation and
//! trailing commas survive the edit. The separator after the last surviving
//! entry is taken from the original last entry, which keeps the closing
//! bracket where it was.
//!
use crate::common::fs::io;
use crate::core::error::{Result, ZfpackError};
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// Location of the descriptor relative to the application root.
pub const DESCRIPTOR_PATH: &str = "config/application.config.php";

fn modules_key() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"['"]modules['"]\s*=>\s*(array\s*\(|\[)"#).ok())
        .as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModuleEntry {
    name: String,
    /// Byte range of the quoted literal in the source.
    span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ModuleList {
    /// Byte range between the opening and closing bracket.
    content: Range<usize>,
    entries: Vec<ModuleEntry>,
}

/// A parsed `application.config.php`.
#[derive(Debug, Clone)]
pub struct ApplicationDescriptor {
    path: PathBuf,
    source: String,
    list: ModuleList,
}

impl ApplicationDescriptor {
    /// Loads the descriptor of the application rooted at `app_root`.
    ///
    /// Fails with `InvalidInput` when the file is missing or does not declare
    /// a non-empty module list.
    pub fn load(app_root: &Path) -> Result<Self> {
        let path = app_root.join(DESCRIPTOR_PATH);
        let not_an_app = || {
            ZfpackError::InvalidInput(format!(
                "the folder \"{}\" does not contain a standard ZF2 application",
                app_root.display()
            ))
        };

        if !path.is_file() {
            return Err(not_an_app().into());
        }
        let source = io::read_file_to_string(&path)?;
        match parse_module_list(&source) {
            Some(list) if !list.entries.is_empty() => {
                debug!(
                    "Found {} modules in {}",
                    list.entries.len(),
                    path.display()
                );
                Ok(Self { path, source, list })
            }
            _ => Err(not_an_app().into()),
        }
    }

    /// Module names in declaration order.
    pub fn modules(&self) -> Vec<&str> {
        self.list.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.list.entries.iter().any(|e| e.name == name)
    }

    /// # Rewrite Module List (`rewrite_modules`)
    ///
    /// Returns the descriptor source with only the entries accepted by `keep`.
    ///
    /// # Arguments
    ///
    /// * `keep` - Predicate called with each module name, in declaration order.
    ///
    /// # Returns
    ///
    /// * `String` - The full PHP source. It is byte-identical to the input when
    ///   every entry is kept. When none is kept the list collapses to its
    ///   brackets plus the whitespace that preceded the closing bracket.
    pub fn rewrite_modules(&self, keep: impl Fn(&str) -> bool) -> String {
        let list = &self.list;
        let entries = &list.entries;
        let kept: Vec<usize> = (0..entries.len()).filter(|&i| keep(&entries[i].name)).collect();
        if kept.len() == entries.len() {
            return self.source.clone();
        }

        // Text between entry `i` and the next entry (or the closing bracket).
        let separator_after = |i: usize| -> Range<usize> {
            let end = entries
                .get(i + 1)
                .map_or(list.content.end, |next| next.span.start);
            entries[i].span.end..end
        };
        let last = entries.len() - 1;
        let mut out = String::with_capacity(self.source.len());

        if kept.is_empty() {
            // Drop the comma after the last entry; keep only the layout before the bracket.
            let tail = &self.source[separator_after(last)];
            let tail = tail.trim_start().strip_prefix(',').unwrap_or(tail);
            out.push_str(&self.source[..list.content.start]);
            out.push_str(tail);
            out.push_str(&self.source[list.content.end..]);
            return out;
        }

        // Everything up to the first entry: the opener and the first indent.
        out.push_str(&self.source[..entries[0].span.start]);
        for (position, &i) in kept.iter().enumerate() {
            out.push_str(&self.source[entries[i].span.clone()]);
            // The last survivor inherits the original last separator, so a
            // trailing comma and the closing bracket's indent stay where they were.
            let separator = if position + 1 == kept.len() {
                separator_after(last)
            } else {
                separator_after(i)
            };
            out.push_str(&self.source[separator]);
        }
        out.push_str(&self.source[list.content.end..]);
        out
    }

    /// Writes the source filtered by `keep` back to the descriptor file.
    pub fn save_filtered(&self, keep: impl Fn(&str) -> bool) -> Result<()> {
        io::write_string_to_file(&self.path, &self.rewrite_modules(keep))
    }
}

/// Finds the `'modules'` list in `source`.
fn parse_module_list(source: &str) -> Option<ModuleList> {
    let found = modules_key()?.captures(source)?;
    let opener = found.get(1)?;
    let close = if opener.as_str().ends_with('(') { b')' } else { b']' };
    let start = opener.end();

    let bytes = source.as_bytes();
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => {
                let (end, raw) = scan_string(source, i)?;
                if depth == 0 {
                    entries.push(ModuleEntry {
                        name: unescape(raw, bytes[i]),
                        span: i..end,
                    });
                }
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line(bytes, i),
            b'#' => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = source[i + 2..].find("*/").map(|p| i + 2 + p + 2)?;
            }
            b'(' | b'[' => {
                depth += 1;
                i += 1;
            }
            c @ (b')' | b']') => {
                if depth == 0 {
                    return (c == close).then_some(ModuleList {
                        content: start..i,
                        entries,
                    });
                }
                depth -= 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Returns the end offset (after the closing quote) and the raw inner text.
fn scan_string(source: &str, start: usize) -> Option<(usize, &str)> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            c if c == quote => return Some((i + 1, &source[start + 1..i])),
            _ => i += 1,
        }
    }
    None
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| start + p)
}

fn unescape(raw: &str, quote: u8) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == quote as char {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const LONG_FORM: &str = r#"<?php
return array(
    'modules' => array(
        'ZfcBase',
        'ZfcUser',
        'Application',
        'Test',
    ),
    'module_listener_options' => array(
        'module_paths' => array(
            './module',
            './vendor',
        ),
    ),
);
"#;

    fn descriptor(source: &str) -> ApplicationDescriptor {
        ApplicationDescriptor {
            path: PathBuf::from(DESCRIPTOR_PATH),
            source: source.to_string(),
            list: parse_module_list(source).expect("module list"),
        }
    }

    #[test]
    fn test_parse_long_array_syntax() {
        let d = descriptor(LONG_FORM);
        assert_eq!(d.modules(), vec!["ZfcBase", "ZfcUser", "Application", "Test"]);
    }

    #[test]
    fn test_parse_short_syntax_with_comments_and_escapes() {
        let source = r#"<?php
return [
    "modules" => [
        'ZF\Apigility',
        "ZF\\Rest", // rest layer
        # 'Disabled',
        /* 'AlsoDisabled', */
        'O\'Reilly',
    ],
];
"#;
        let d = descriptor(source);
        assert_eq!(d.modules(), vec!["ZF\\Apigility", "ZF\\Rest", "O'Reilly"]);
        assert!(d.contains_module("ZF\\Apigility"));
    }

    #[test]
    fn test_missing_or_unterminated_list() {
        assert!(parse_module_list("<?php return array('db' => array());").is_none());
        assert!(parse_module_list("<?php return array('modules' => array('A',").is_none());
    }

    #[test]
    fn test_rewrite_preserves_layout() {
        let d = descriptor(LONG_FORM);
        let rewritten = d.rewrite_modules(|name| name != "Test");
        let expected = LONG_FORM.replace("        'Test',\n", "");
        assert_eq!(rewritten, expected);
    }

    #[test]
    fn test_rewrite_inline_list() {
        let source = "<?php return ['modules' => ['A', 'B', 'C'], 'x' => [1]];";
        let d = descriptor(source);
        assert_eq!(
            d.rewrite_modules(|name| name == "A"),
            "<?php return ['modules' => ['A'], 'x' => [1]];"
        );
        assert_eq!(
            d.rewrite_modules(|name| name != "A"),
            "<?php return ['modules' => ['B', 'C'], 'x' => [1]];"
        );
        assert_eq!(d.rewrite_modules(|_| true), source);
    }

    #[test]
    fn test_rewrite_removing_every_module() {
        let d = descriptor("<?php\nreturn array(\n    'modules' => array(\n        'Application',\n    ),\n);\n");
        assert_eq!(
            d.rewrite_modules(|_| false),
            "<?php\nreturn array(\n    'modules' => array(\n    ),\n);\n"
        );

        let inline = descriptor("<?php return ['modules' => ['A', 'B']];");
        assert_eq!(inline.rewrite_modules(|_| false), "<?php return ['modules' => []];");
    }

    #[test]
    fn test_load_rejects_non_applications() -> Result<()> {
        let dir = tempdir()?;
        let err = ApplicationDescriptor::load(dir.path()).unwrap_err();
        assert!(err
            .to_string()
            .contains("does not contain a standard ZF2 application"));

        fs::create_dir_all(dir.path().join("config"))?;
        fs::write(
            dir.path().join(DESCRIPTOR_PATH),
            "<?php return array('modules' => array());",
        )?;
        assert!(ApplicationDescriptor::load(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_load_and_save_filtered() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("config"))?;
        fs::write(dir.path().join(DESCRIPTOR_PATH), LONG_FORM)?;

        let d = ApplicationDescriptor::load(dir.path())?;
        d.save_filtered(|name| name != "Test")?;

        let reloaded = ApplicationDescriptor::load(dir.path())?;
        assert_eq!(reloaded.modules(), vec!["ZfcBase", "ZfcUser", "Application"]);
        Ok(())
    }
}
