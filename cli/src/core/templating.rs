//! # zfpack Placeholder Templating
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Renders the packaged `deployment.xml` template. The template uses simple
//! brace placeholders (`{NAME}`, `{VERSION}`, `{LOGO}`) that are substituted
//! verbatim: values are not escaped, and unknown placeholders are left in place
//! so the manifest validation can report them.
//!
//! Substitution follows the order of the context slice. A value that itself
//! contains a placeholder is only expanded by the keys that come after it, so
//! the same inputs always render the same text.
//!
//! ## Usage
//!
//! ```rust
//! let context = [("NAME", "shop"), ("VERSION", "1.0.0")];
//! let rendered = templating::render_placeholders("<name>{NAME}</name>", &context);
//! assert_eq!(rendered, "<name>shop</name>");
//! ```
//!
use crate::core::error::Result; // Standard Result
use anyhow::Context; // For error context wrapping
use std::fs;
use std::path::Path;
use tracing::{debug, info}; // Logging utilities

/// # Render Placeholders (`render_placeholders`)
///
/// Replaces every `{KEY}` occurrence in `template`, one key at a time in the
/// order given by `context`.
///
/// # Arguments
///
/// * `template` - Text containing `{KEY}` placeholders.
/// * `context` - `(KEY, value)` pairs, applied front to back.
///
/// # Returns
///
/// * `String` - The rendered text. Placeholders without a matching key are kept.
pub fn render_placeholders(template: &str, context: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in context {
        let placeholder = format!("{{{}}}", key);
        // Skip the allocation of `replace` when the key is absent.
        if rendered.contains(&placeholder) {
            debug!("Substituting placeholder {} with '{}'", placeholder, value);
            rendered = rendered.replace(&placeholder, value);
        }
    }
    rendered
}

/// # Render Template To File (`render_to_file`)
///
/// Renders `template` with `context` and writes the result to `target_path`,
/// replacing any existing file.
///
/// # Errors
///
/// Returns an `Err` if the file cannot be written.
pub fn render_to_file(template: &str, context: &[(&str, &str)], target_path: &Path) -> Result<()> {
    let rendered = render_placeholders(template, context);
    fs::write(target_path, rendered).with_context(|| {
        format!(
            "Failed to write rendered template '{}'",
            target_path.display()
        )
    })?;
    info!("Rendered template to '{}'", target_path.display());
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render_replaces_all_occurrences() {
        let ctx = [("NAME", "shop"), ("VERSION", "1.0.0")];
        let rendered = render_placeholders("{NAME}-{VERSION} ({NAME})", &ctx);
        assert_eq!(rendered, "shop-1.0.0 (shop)");
    }

    #[test]
    fn test_render_does_not_escape_values() {
        let ctx = [("NAME", "a&b<c>")];
        assert_eq!(render_placeholders("<name>{NAME}</name>", &ctx), "<name>a&b<c></name>");
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let ctx = [("NAME", "shop")];
        assert_eq!(render_placeholders("{NAME} {LOGO}", &ctx), "shop {LOGO}");
    }

    #[test]
    fn test_render_order_is_fixed() {
        // A version carrying a later placeholder is expanded by that later key.
        let ctx = [("NAME", "shop"), ("VERSION", "1.0-{LOGO}"), ("LOGO", "zf2-logo.png")];
        for _ in 0..8 {
            assert_eq!(
                render_placeholders("{VERSION}|{LOGO}", &ctx),
                "1.0-zf2-logo.png|zf2-logo.png"
            );
        }

        // An earlier key is not applied again to values substituted after it.
        let ctx = [("NAME", "shop"), ("VERSION", "{NAME}")];
        assert_eq!(render_placeholders("{VERSION}", &ctx), "{NAME}");
    }

    #[test]
    fn test_render_to_file() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("deployment.xml");
        render_to_file("<icon>{LOGO}</icon>", &[("LOGO", "zf2-logo.png")], &target)?;
        assert_eq!(fs::read_to_string(target)?, "<icon>zf2-logo.png</icon>");
        Ok(())
    }
}
