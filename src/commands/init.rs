use std::fs;

use crate::catalog::{Catalog, PresetDescriptor, TemplateEntry};
use crate::cli::InitCmd;
use crate::error::{DevforgeError, Result};
use crate::generator::Generator;
use crate::repo::ensure_git_available;
use crate::spec::v0_1::{
    ClaudeSection, DockerSection, GitSection, MarketplaceSection, PluginSection, ProxySection,
    RuntimeSection, SpecDocument, WorkspaceSection,
};
use crate::spec::{self, SchemaVersion, SpecOverrides};

pub fn execute(cmd: &InitCmd) -> Result<()> {
    let catalog = Catalog::load()?;

    let preset = match &cmd.preset {
        Some(name) => Some(catalog.preset(name)?),
        None => None,
    };
    let template_name = cmd
        .template
        .clone()
        .or_else(|| preset.map(|p| p.template.clone()))
        .unwrap_or_else(|| "generic".to_string());
    let template = catalog.template(&template_name)?;

    // Bake template, preset, and flags into a self-contained document so a
    // later `generate` run reproduces the same project from the file alone.
    let document = build_document(cmd, template, preset)?;
    let text = toml::to_string_pretty(&document)?;

    // Resolve before writing anything; validation failures must leave the
    // output directory untouched.
    let project_spec = spec::resolve(&text, None, &SpecOverrides::default())?;
    let generator = Generator::new(&project_spec, template)?.dry_run(cmd.dry_run);

    let project_root = cmd.output.join(&cmd.name);
    let config_path = project_root.join("devforge.toml");

    if !cmd.dry_run {
        if config_path.exists() && !cmd.yes {
            return Err(DevforgeError::InvalidConfig(format!(
                "{} already exists. Pass --yes to overwrite it.",
                config_path.display()
            )));
        }
        ensure_git_available()?;
        fs::create_dir_all(&project_root)?;
        fs::write(&config_path, &text)?;
        println!("Wrote {}", config_path.display());
    }

    let report = generator.generate(&project_root)?;
    super::print_report(&report, cmd.dry_run);

    if !cmd.dry_run {
        println!("Project '{}' created at {}", cmd.name, project_root.display());
    }
    Ok(())
}

fn build_document(
    cmd: &InitCmd,
    template: &TemplateEntry,
    preset: Option<&PresetDescriptor>,
) -> Result<SpecDocument> {
    let info = &template.info;

    let runtime = match &info.language {
        Some(language) => {
            let version = cmd
                .lang_version
                .clone()
                .or_else(|| preset.and_then(|p| p.lang_version.clone()))
                .or_else(|| info.lang_version_default.clone())
                .ok_or_else(|| {
                    DevforgeError::InvalidConfig(format!(
                        "template '{}' declares a language but no version; pass --lang-version",
                        info.name
                    ))
                })?;
            info.require_version(&version)?;
            Some(RuntimeSection {
                language: language.clone(),
                version,
                package_manager: info
                    .package_manager
                    .clone()
                    .unwrap_or_else(|| "apt".to_string()),
                tools: Vec::new(),
            })
        }
        None => None,
    };

    let proxy = if cmd.proxy_http.is_some() || cmd.proxy_https.is_some() || cmd.no_proxy.is_some()
    {
        Some(ProxySection {
            http: cmd.proxy_http.clone(),
            https: cmd.proxy_https.clone(),
            no_proxy: cmd.no_proxy.clone(),
        })
    } else {
        None
    };

    let mut marketplaces = std::collections::BTreeMap::new();
    let mut plugins = Vec::new();
    if let Some(preset) = preset {
        for (name, url) in &preset.marketplaces {
            marketplaces.insert(name.clone(), MarketplaceSection { url: url.clone() });
        }
        for (qualified, activate) in preset.plugin_defaults() {
            let (name, marketplace) = qualified.split_once('@').ok_or_else(|| {
                DevforgeError::InvalidConfig(format!(
                    "preset plugin '{}' must be qualified as name@marketplace",
                    qualified
                ))
            })?;
            plugins.push(PluginSection {
                marketplace: marketplace.to_string(),
                name: name.to_string(),
                activate,
            });
        }
    }

    Ok(SpecDocument {
        version: SchemaVersion::current().as_str().to_string(),
        name: cmd.name.clone(),
        template: info.name.clone(),
        workspace: WorkspaceSection::default(),
        docker: DockerSection {
            image: info.image.clone(),
            build_args: Vec::new(),
        },
        claude: ClaudeSection {
            version: cmd
                .claude_version
                .clone()
                .unwrap_or_else(|| "latest".to_string()),
            provider: cmd
                .claude_provider
                .clone()
                .unwrap_or_else(|| "anthropic".to_string()),
            models: Default::default(),
        },
        runtime,
        proxy,
        marketplaces,
        plugins,
        git: GitSection::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn init_cmd(name: &str) -> InitCmd {
        InitCmd {
            name: name.to_string(),
            template: None,
            preset: None,
            lang_version: None,
            claude_version: None,
            claude_provider: None,
            proxy_http: None,
            proxy_https: None,
            no_proxy: None,
            output: PathBuf::from("."),
            dry_run: false,
            yes: false,
        }
    }

    #[test]
    fn test_build_document_generic_defaults() {
        let catalog = Catalog::load().unwrap();
        let template = catalog.template("generic").unwrap();
        let doc = build_document(&init_cmd("app"), template, None).unwrap();

        assert_eq!(doc.version, "0.1");
        assert_eq!(doc.template, "generic");
        assert!(doc.runtime.is_none());
        assert!(doc.plugins.is_empty());
        assert_eq!(doc.claude.provider, "anthropic");
    }

    #[test]
    fn test_build_document_python_runtime() {
        let catalog = Catalog::load().unwrap();
        let template = catalog.template("python").unwrap();
        let doc = build_document(&init_cmd("app"), template, None).unwrap();

        let runtime = doc.runtime.unwrap();
        assert_eq!(runtime.language, "python");
        assert_eq!(runtime.version, "3.12");
        assert_eq!(runtime.package_manager, "uv");
    }

    #[test]
    fn test_build_document_rejects_unsupported_version() {
        let catalog = Catalog::load().unwrap();
        let template = catalog.template("python").unwrap();
        let mut cmd = init_cmd("app");
        cmd.lang_version = Some("2.7".to_string());

        let err = build_document(&cmd, template, None).unwrap_err();
        assert!(matches!(err, DevforgeError::UnsupportedVersion { .. }));
    }

    #[test]
    fn test_build_document_with_preset_plugins() {
        let catalog = Catalog::load().unwrap();
        let preset = catalog.preset("python-uv").unwrap();
        let template = catalog.template(&preset.template).unwrap();
        let doc = build_document(&init_cmd("app"), template, Some(preset)).unwrap();

        assert!(doc.marketplaces.contains_key("omc"));
        assert_eq!(doc.plugins.len(), 1);
        assert_eq!(doc.plugins[0].name, "oh-my-claudecode");
        assert!(doc.plugins[0].activate);
    }

    #[test]
    fn test_built_document_resolves() {
        let catalog = Catalog::load().unwrap();
        let preset = catalog.preset("node-pnpm").unwrap();
        let template = catalog.template(&preset.template).unwrap();
        let doc = build_document(&init_cmd("app"), template, Some(preset)).unwrap();

        let text = toml::to_string_pretty(&doc).unwrap();
        let spec = spec::resolve(&text, None, &SpecOverrides::default()).unwrap();
        assert_eq!(spec.name, "app");
        assert_eq!(spec.runtime.unwrap().version, "22");
    }
}
