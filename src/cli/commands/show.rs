use anyhow::Result;
use std::path::Path;

use crate::definition;
use crate::error::TrellisError;
use crate::traverse::dump;

pub fn run_show(file: &Path) -> Result<()> {
    let root = definition::load(file).map_err(TrellisError::from)?;
    print!("{}", dump(&root));
    Ok(())
}
