//! End-to-end pipeline tests against a temporary directory, with the git
//! runner stubbed out.

use std::fs;
use std::path::Path;

use devforge::catalog::Catalog;
use devforge::error::Result;
use devforge::generator::Generator;
use devforge::plugins::{PluginRegistry, PluginScope, RegistryEntry};
use devforge::repo::GitRunner;
use devforge::spec::{resolve, SpecOverrides};

struct NoopGit;

impl GitRunner for NoopGit {
    fn run(&self, _dir: &Path, _args: &[&str]) -> Result<()> {
        Ok(())
    }
}

const DOC: &str = r#"
version = "0.1"
name = "pipeline-app"
template = "node"

[docker]
image = "mcr.microsoft.com/devcontainers/base:ubuntu"

[claude]
version = "latest"
provider = "bedrock"

[claude.models]
sonnet = "claude-3-5-sonnet-20241022"

[runtime]
language = "node"
version = "22"
package_manager = "pnpm"

[marketplaces.omc]
url = "https://github.com/oh-my-claudecode/marketplace"

[[plugins]]
marketplace = "omc"
name = "oh-my-claudecode"
activate = true

[[plugins]]
marketplace = "omc"
name = "noisy-plugin"
activate = false
"#;

fn registry() -> PluginRegistry {
    PluginRegistry::from_entries([
        RegistryEntry {
            id: "oh-my-claudecode@omc".to_string(),
            scope: PluginScope::Project,
            install_path: "/plugins/oh-my-claudecode".into(),
        },
        RegistryEntry {
            id: "noisy-plugin@omc".to_string(),
            scope: PluginScope::Project,
            install_path: "/plugins/noisy-plugin".into(),
        },
    ])
}

fn run_pipeline(output: &Path) -> devforge::generator::GenerationReport {
    let spec = resolve(DOC, None, &SpecOverrides::default()).unwrap();
    let catalog = Catalog::load().unwrap();
    let template = catalog.template(&spec.template).unwrap();
    Generator::new(&spec, template)
        .unwrap()
        .with_git_runner(Box::new(NoopGit))
        .with_registry(registry())
        .generate(output)
        .unwrap()
}

#[test]
fn test_full_generation_tree() {
    let temp = tempfile::tempdir().unwrap();
    let report = run_pipeline(temp.path());

    for rel in [
        ".devcontainer/devcontainer.json",
        ".devcontainer/Dockerfile",
        ".devcontainer/provider",
        ".devcontainer/.gitignore",
        ".devcontainer/features/proxy/install.sh",
        ".devcontainer/features/claude-code/install.sh",
        ".devcontainer/features/plugin-manager/install.sh",
        "project/.claude/config.json",
        "project/.claude/settings.json",
        "project/.gitignore",
        "project/README.md",
    ] {
        assert!(temp.path().join(rel).exists(), "missing {}", rel);
    }

    assert!(report.modified.is_empty());
    assert!(report.skipped.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn test_rendered_devcontainer_reflects_spec() {
    let temp = tempfile::tempdir().unwrap();
    run_pipeline(temp.path());

    let json = fs::read_to_string(temp.path().join(".devcontainer/devcontainer.json")).unwrap();
    assert!(json.contains("pipeline-app"));
    assert!(json.contains("\"provider\": \"bedrock\""));
    assert!(json.contains("\"activate_plugins\": [\"oh-my-claudecode\"]"));
    assert!(json.contains("\"deactivate_plugins\": [\"noisy-plugin\"]"));
    assert!(!json.contains("{{"));

    let dockerfile = fs::read_to_string(temp.path().join(".devcontainer/Dockerfile")).unwrap();
    assert!(dockerfile.contains("ARG NODE_VERSION=22"));
}

#[test]
fn test_settings_reflect_activation_plan() {
    let temp = tempfile::tempdir().unwrap();
    run_pipeline(temp.path());

    let settings =
        fs::read_to_string(temp.path().join("project/.claude/settings.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&settings).unwrap();
    let plugins = value["enabledPlugins"].as_object().unwrap();
    assert_eq!(plugins["oh-my-claudecode@omc"], true);
    assert_eq!(plugins["noisy-plugin@omc"], false);
}

#[test]
fn test_provider_marker_matches_spec() {
    let temp = tempfile::tempdir().unwrap();
    run_pipeline(temp.path());

    let marker = fs::read_to_string(temp.path().join(".devcontainer/provider")).unwrap();
    assert_eq!(marker, "bedrock\n");
}

#[test]
fn test_rerun_is_idempotent() {
    let temp = tempfile::tempdir().unwrap();
    run_pipeline(temp.path());

    let json_before =
        fs::read_to_string(temp.path().join(".devcontainer/devcontainer.json")).unwrap();
    let report = run_pipeline(temp.path());
    let json_after =
        fs::read_to_string(temp.path().join(".devcontainer/devcontainer.json")).unwrap();

    assert_eq!(json_before, json_after);
    assert!(report.created.is_empty());
    assert!(report
        .skipped
        .iter()
        .any(|p| p.ends_with("devcontainer.json")));
}

#[test]
fn test_rerun_replaces_feature_bundles_wholesale() {
    let temp = tempfile::tempdir().unwrap();
    run_pipeline(temp.path());

    // Inject a stale file into a provisioned bundle; the next run must
    // remove it rather than merge around it.
    let stale = temp
        .path()
        .join(".devcontainer/features/proxy/stale-leftover.sh");
    fs::write(&stale, "echo stale").unwrap();

    run_pipeline(temp.path());
    assert!(!stale.exists());
}
