use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::{DevforgeError, Result};
use crate::generator::Generator;
use crate::repo::ensure_git_available;
use crate::spec::{self, SpecOverrides};

pub fn execute(config: &Path, output: Option<&Path>, dry_run: bool) -> Result<()> {
    let text = fs::read_to_string(config).map_err(|e| {
        DevforgeError::InvalidConfig(format!("Failed to read {}: {}", config.display(), e))
    })?;

    let project_spec = spec::resolve(&text, None, &SpecOverrides::default())?;
    let catalog = Catalog::load()?;
    let template = catalog.template(&project_spec.template)?;
    let generator = Generator::new(&project_spec, template)?.dry_run(dry_run);

    let output_dir: PathBuf = match output {
        Some(dir) => dir.to_path_buf(),
        None => config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };

    if !dry_run {
        ensure_git_available()?;
    }

    let report = generator.generate(&output_dir)?;
    super::print_report(&report, dry_run);
    Ok(())
}
