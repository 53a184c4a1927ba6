//! The generation pipeline.
//!
//! One [`Generator`] invocation owns the resolved spec and runs the steps in
//! order: render container-definition files, provision feature bundles, write
//! project configuration and the provider marker, resolve plugin activation,
//! merge settings, initialize repositories. A fatal error aborts the
//! remaining steps; files already written stay on disk (callers wanting
//! atomicity generate into a temporary location and move it into place).
//!
//! Dry-run mode performs every step except writes, bundle copies, and git
//! subprocesses, and reports the same path lists a real run would.

use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::BundleProvisioner;
use crate::catalog::TemplateEntry;
use crate::error::Result;
use crate::plugins::{resolve_activation, PluginRegistry};
use crate::render::{render, TokenTable};
use crate::repo::{init_repository, GitRunner, SystemGit};
use crate::settings::merged_document;
use crate::spec::{GeneratedFilesPolicy, ProjectSpec};
use crate::state::{marker_content, PROVIDER_MARKER_FILE};

/// Relative path to the installed-plugin registry inside the workspace.
const REGISTRY_PATH: &str = ".claude/plugins/registry.json";

/// Relative path to the persisted settings document inside the workspace.
const SETTINGS_PATH: &str = ".claude/settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOutcome {
    Created,
    Modified,
    Skipped,
}

/// Paths touched by one generation run, relative to the output directory.
/// The three lists are disjoint: a path lands in exactly one of them.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub created: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl GenerationReport {
    fn record(&mut self, path: PathBuf, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.created.push(path),
            WriteOutcome::Modified => self.modified.push(path),
            WriteOutcome::Skipped => self.skipped.push(path),
        }
    }
}

pub struct Generator<'a> {
    spec: &'a ProjectSpec,
    template: &'a TemplateEntry,
    bundles: BundleProvisioner,
    registry_override: Option<PluginRegistry>,
    git: Box<dyn GitRunner>,
    dry_run: bool,
}

impl<'a> Generator<'a> {
    /// Create a generator, checking the template's language-version
    /// invariant up front so the failure happens before any write.
    pub fn new(spec: &'a ProjectSpec, template: &'a TemplateEntry) -> Result<Self> {
        if let Some(runtime) = &spec.runtime {
            template.info.require_version(&runtime.version)?;
        }

        Ok(Self {
            spec,
            template,
            bundles: BundleProvisioner::embedded(),
            registry_override: None,
            git: Box::new(SystemGit),
            dry_run: false,
        })
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_git_runner(mut self, runner: Box<dyn GitRunner>) -> Self {
        self.git = runner;
        self
    }

    pub fn with_bundles(mut self, bundles: BundleProvisioner) -> Self {
        self.bundles = bundles;
        self
    }

    /// Use a fixed registry instead of reading one from the workspace.
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry_override = Some(registry);
        self
    }

    /// Run the pipeline against `output_dir`.
    pub fn generate(&self, output_dir: &Path) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();
        let table = TokenTable::from_spec(self.spec);

        let workspace_dir = output_dir.join(&self.spec.workspace_dir);
        let devcontainer_dir = output_dir.join(".devcontainer");

        // Render before touching the filesystem so token errors leave a
        // clean tree.
        let devcontainer_json =
            render("devcontainer.json", &self.template.devcontainer, &table)?;
        let dockerfile = render("Dockerfile", &self.template.dockerfile, &table)?;

        if !self.dry_run {
            fs::create_dir_all(&workspace_dir)?;
            fs::create_dir_all(&devcontainer_dir)?;
        }

        self.emit(
            &mut report,
            output_dir,
            &devcontainer_dir.join("devcontainer.json"),
            &devcontainer_json,
        )?;
        self.emit(
            &mut report,
            output_dir,
            &devcontainer_dir.join("Dockerfile"),
            &dockerfile,
        )?;

        self.provision_features(&mut report, output_dir, &devcontainer_dir)?;

        self.emit(
            &mut report,
            output_dir,
            &workspace_dir.join(".claude/config.json"),
            &self.render_claude_config()?,
        )?;
        self.emit(
            &mut report,
            output_dir,
            &devcontainer_dir.join(PROVIDER_MARKER_FILE),
            &marker_content(self.spec.provider),
        )?;

        self.emit(
            &mut report,
            output_dir,
            &workspace_dir.join(".gitignore"),
            &self.render_workspace_gitignore(),
        )?;
        if self.spec.generated_files == GeneratedFilesPolicy::LinguistGenerated {
            self.emit(
                &mut report,
                output_dir,
                &workspace_dir.join(".gitattributes"),
                &self.render_gitattributes(),
            )?;
        }
        self.emit(
            &mut report,
            output_dir,
            &devcontainer_dir.join(".gitignore"),
            &self.render_devcontainer_gitignore(),
        )?;
        self.emit(
            &mut report,
            output_dir,
            &workspace_dir.join("README.md"),
            &self.render_readme(),
        )?;

        self.merge_plugin_settings(&mut report, output_dir, &workspace_dir)?;

        if !self.dry_run {
            init_repository(self.git.as_ref(), &workspace_dir, "Initial commit")?;
            init_repository(
                self.git.as_ref(),
                &devcontainer_dir,
                "Initial devcontainer setup",
            )?;
        }

        Ok(report)
    }

    fn provision_features(
        &self,
        report: &mut GenerationReport,
        output_dir: &Path,
        devcontainer_dir: &Path,
    ) -> Result<()> {
        let features_dir = devcontainer_dir.join("features");

        for feature in &self.template.info.features {
            let dest = features_dir.join(&feature.name);
            let existed = dest.exists();

            if self.dry_run {
                // A missing bundle still fails a dry run.
                self.bundles.verify(&feature.name)?;
            } else {
                self.bundles.provision(&feature.name, &features_dir)?;
            }

            let outcome = if existed {
                WriteOutcome::Modified
            } else {
                WriteOutcome::Created
            };
            report.record(relative(output_dir, &dest), outcome);
        }

        Ok(())
    }

    fn merge_plugin_settings(
        &self,
        report: &mut GenerationReport,
        output_dir: &Path,
        workspace_dir: &Path,
    ) -> Result<()> {
        let registry = match &self.registry_override {
            Some(registry) => registry.clone(),
            None => PluginRegistry::load(&workspace_dir.join(REGISTRY_PATH))?,
        };

        let activate: Vec<String> = self
            .spec
            .plugins
            .iter()
            .filter(|p| p.activate)
            .map(|p| p.qualified_name())
            .collect();
        let deactivate: Vec<String> = self
            .spec
            .plugins
            .iter()
            .filter(|p| !p.activate)
            .map(|p| p.qualified_name())
            .collect();

        let plan = resolve_activation(&registry, &activate, &deactivate);
        report.warnings.extend(plan.warnings.iter().cloned());

        let settings_path = workspace_dir.join(SETTINGS_PATH);
        let existing = if settings_path.exists() {
            Some(fs::read_to_string(&settings_path)?)
        } else {
            None
        };
        let merged = merged_document(existing.as_deref(), &settings_path, &plan)?;
        self.emit(report, output_dir, &settings_path, &merged)
    }

    /// Write `content` to `path`, classifying the outcome. Identical content
    /// is skipped, never rewritten. Dry runs classify without writing.
    fn emit(
        &self,
        report: &mut GenerationReport,
        output_dir: &Path,
        path: &Path,
        content: &str,
    ) -> Result<()> {
        let outcome = if path.exists() {
            if fs::read(path)? == content.as_bytes() {
                WriteOutcome::Skipped
            } else {
                WriteOutcome::Modified
            }
        } else {
            WriteOutcome::Created
        };

        if !self.dry_run && outcome != WriteOutcome::Skipped {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, content)?;
        }

        report.record(relative(output_dir, path), outcome);
        Ok(())
    }

    fn render_claude_config(&self) -> Result<String> {
        let config = serde_json::json!({
            "provider": self.spec.provider.as_str(),
            "version": self.spec.claude_version,
            "models": self.spec.models,
        });
        let mut out = serde_json::to_string_pretty(&config)?;
        out.push('\n');
        Ok(out)
    }

    fn render_workspace_gitignore(&self) -> String {
        let mut content = String::new();
        if self.spec.generated_files == GeneratedFilesPolicy::Ignored {
            content.push_str("# Generated Claude Code configuration\n.claude/\n\n");
        }
        content.push_str(
            r#"# IDE
.vscode/
.idea/

# OS
.DS_Store
Thumbs.db

# Python
__pycache__/
*.py[cod]
.venv/
venv/

# Node
node_modules/
npm-debug.log*

# Rust
target/

# Go
*.test
*.prof
"#,
        );
        content
    }

    fn render_gitattributes(&self) -> String {
        ".claude/** linguist-generated=true\n".to_string()
    }

    fn render_devcontainer_gitignore(&self) -> String {
        r#"# Local Claude Code state (not in git)
.claude/
settings.json

# IDE files
.vscode/
.idea/
"#
        .to_string()
    }

    fn render_readme(&self) -> String {
        format!(
            r#"# {}

This project was created with devforge.

## Getting Started

1. Open this project in VS Code
2. Reopen in Container when prompted
3. Start coding!

## Project Structure

- `{}/` - Your project code (its own git repository)
- `.devcontainer/` - Container definition (separate git repository)
- `.claude/` - Claude Code configuration

To rebuild the container, press F1 in VS Code and select
"Dev Containers: Rebuild Container".
"#,
            self.spec.name,
            self.spec.workspace_dir.trim_start_matches("./"),
        )
    }
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
