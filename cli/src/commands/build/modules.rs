//! # Module Selection (`build::modules`)
//!
//! File: cli/src/commands/build/modules.rs
//!
//! ## Overview
//!
//! Packages only a subset of the application's modules (`--modules A,B`).
//! The generic tree copy has already skipped `module/` entirely; this stage
//! copies each requested module back in and then trims the staged
//! `application.config.php` so the application does not try to load the
//! modules that were left out.
//!
//! An entry is removed from the module list only when the source application
//! has a `module/<Name>` directory for it and it was not requested. Entries
//! without a local directory are framework or vendor modules (`ZfcBase`,
//! `ZF\Rest`, ...) and are kept.
//!
use super::application::{ApplicationDescriptor, DESCRIPTOR_PATH}; // Staged module list
use super::request::module_dir; // `ZF\Apigility` -> `ZF/Apigility`
use crate::common::fs::copy; // Filtered tree copy
use crate::common::fs::exclude::ExclusionSet;
use crate::core::error::Result;
use std::path::Path;
use tracing::{debug, info}; // Logging utilities

/// # Restrict Modules (`restrict`)
///
/// Copies the requested modules into `staging` and rewrites the staged
/// module list so only those modules (plus framework modules without a local
/// directory) stay enabled.
///
/// # Arguments
///
/// * `source` - Root of the application being packaged.
/// * `staging` - Directory the application was copied into.
/// * `requested` - Module names from `--modules`; either separator is accepted.
/// * `use_gitignore` - Whether `.gitignore` files inside the modules are honoured.
///
/// # Returns
///
/// * `Result<()>` - `Ok(())` once the modules are copied and the list rewritten.
///   Does nothing when `requested` is empty.
///
/// # Errors
///
/// Returns an `Err` if a module copy fails or the staged descriptor cannot be
/// read or written.
pub fn restrict(source: &Path, staging: &Path, requested: &[String], use_gitignore: bool) -> Result<()> {
    if requested.is_empty() {
        return Ok(());
    }

    for module in requested {
        // Namespaced modules live in nested directories.
        let relative = Path::new("module").join(module_dir(module));
        info!("Copying module {}", module);
        copy::copy_tree(
            &source.join(&relative),
            &staging.join(&relative),
            &ExclusionSet::new(),
            use_gitignore,
        )?;
    }

    if !staging.join(DESCRIPTOR_PATH).is_file() {
        debug!("No staged {}; module list left as is", DESCRIPTOR_PATH);
        return Ok(());
    }

    // Compare on directory form so `ZF/Apigility` matches a `ZF\Apigility` entry.
    let wanted: Vec<String> = requested.iter().map(|r| module_dir(r)).collect();
    let descriptor = ApplicationDescriptor::load(staging)?;
    descriptor.save_filtered(|name| {
        let dir = module_dir(name);
        let keep = wanted.contains(&dir) || !source.join("module").join(&dir).is_dir();
        if !keep {
            debug!("Removing {} from the module list", name);
        }
        keep
    })
}
