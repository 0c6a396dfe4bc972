use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::app::AppConfig;
use crate::definition;
use crate::error::TrellisError;
use crate::validate::validate_with;

/// Print every unresolved requirement and fail when there are any
pub fn run_validate(file: &Path, config: &AppConfig, json: bool) -> Result<()> {
    let root = definition::load(file).map_err(TrellisError::from)?;
    let unresolved = validate_with(&root, &config.vars);

    if json {
        let report =
            serde_json::to_string_pretty(&unresolved).context("Failed to encode report")?;
        println!("{report}");
    } else {
        for entry in &unresolved {
            println!("{entry}");
        }
    }

    if unresolved.is_empty() {
        info!("{} is valid", file.display());
        return Ok(());
    }
    Err(TrellisError::Validation { unresolved }.into())
}
