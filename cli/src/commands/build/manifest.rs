//! # Deployment Manifest Validation (`build::manifest`)
//!
//! File: cli/src/commands/build/manifest.rs
//!
//! ## Overview
//!
//! Checks a Zend Server `deployment.xml` before it is shipped in a `.zpk`.
//! Validation is a typed deserialization (`quick-xml` + `serde`) into the
//! descriptor shape Zend Server requires:
//!
//! - the document element is `<package>`;
//! - `<name>`, `<version><release>` and `<appdir>` are present and non-empty;
//! - `<type>`, when present, is `application` or `library`;
//! - no `{NAME}`, `{VERSION}` or `{LOGO}` template placeholder is left over.
//!
//! Optional elements (`<summary>`, `<description>`, `<icon>`, `<docroot>`,
//! `<scriptsdir>`, `<eula>`) are read when present. Anything else, such as
//! `<dependencies>`, is accepted without inspection.
//!
use crate::core::error::{Result, ZfpackError};
use anyhow::Context;
use quick_xml::events::Event; // Root element scan
use quick_xml::Reader;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// File name of the manifest inside a zpk.
pub const DEPLOYMENT_XML: &str = "deployment.xml";

const PLACEHOLDERS: [&str; 3] = ["{NAME}", "{VERSION}", "{LOGO}"];

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DeploymentDescriptor {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub name: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub version: Version,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub eula: Option<String>,
    pub appdir: String,
    #[serde(default)]
    pub docroot: Option<String>,
    #[serde(default)]
    pub scriptsdir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Version {
    pub release: String,
}

/// Checks manifest `content`, returning the parsed descriptor or the reason it is invalid.
pub fn check(content: &str) -> std::result::Result<DeploymentDescriptor, String> {
    if let Some(placeholder) = PLACEHOLDERS.iter().find(|p| content.contains(*p)) {
        return Err(format!("unresolved placeholder {}", placeholder));
    }

    let root = root_element(content)?;
    if root != "package" {
        return Err(format!("root element is <{}>, expected <package>", root));
    }

    let descriptor: DeploymentDescriptor =
        quick_xml::de::from_str(content).map_err(|e| e.to_string())?;

    if descriptor.name.trim().is_empty() {
        return Err("<name> must not be empty".to_string());
    }
    if descriptor.version.release.trim().is_empty() {
        return Err("<version><release> must not be empty".to_string());
    }
    if descriptor.appdir.trim().is_empty() {
        return Err("<appdir> must not be empty".to_string());
    }
    if let Some(kind) = &descriptor.kind {
        if kind != "application" && kind != "library" {
            return Err(format!(
                "<type> must be \"application\" or \"library\", found \"{}\"",
                kind
            ));
        }
    }
    Ok(descriptor)
}

/// Reads and checks the manifest at `path`.
///
/// # Errors
///
/// Returns an `Err` if the file cannot be read. An invalid document yields
/// `ZfpackError::SchemaValidation` naming the file.
pub fn validate_file(path: &Path) -> Result<DeploymentDescriptor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read deployment XML {}", path.display()))?;
    let descriptor = check(&content).map_err(|reason| ZfpackError::SchemaValidation {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(
        "{} describes {} {}",
        path.display(),
        descriptor.name,
        descriptor.version.release
    );
    Ok(descriptor)
}

fn root_element(content: &str) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(content);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err("document has no root element".to_string()),
            Ok(_) => continue,
            Err(e) => return Err(e.to_string()),
        }
    }
}
