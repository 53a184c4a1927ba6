use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{DevforgeError, Result};
use crate::spec::{self, SpecOverrides};

/// Resolve and validate a specification document without generating
/// anything. Every violation is reported at once.
pub fn execute(config: &Path) -> Result<()> {
    let text = fs::read_to_string(config).map_err(|e| {
        DevforgeError::InvalidConfig(format!("Failed to read {}: {}", config.display(), e))
    })?;

    let project_spec = spec::resolve(&text, None, &SpecOverrides::default())?;

    // Static template checks apply even without a generation run.
    let catalog = Catalog::load()?;
    let template = catalog.template(&project_spec.template)?;
    if let Some(runtime) = &project_spec.runtime {
        template.info.require_version(&runtime.version)?;
    }

    println!("{} is valid (schema {})", config.display(), project_spec.schema_version);
    Ok(())
}
