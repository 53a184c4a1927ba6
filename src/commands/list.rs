use crate::catalog::Catalog;
use crate::error::Result;

pub fn templates() -> Result<()> {
    let catalog = Catalog::load()?;

    println!("Available templates:");
    for entry in catalog.templates() {
        let info = &entry.info;
        println!("  {:<12} {}", info.name, info.description);
        if !info.supported_versions.is_empty() {
            println!(
                "  {:<12} versions: {} (default {})",
                "",
                info.supported_versions.join(", "),
                info.lang_version_default.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

pub fn presets() -> Result<()> {
    let catalog = Catalog::load()?;

    println!("Available presets:");
    for preset in catalog.presets() {
        let lang = preset
            .lang_version
            .as_deref()
            .map(|v| format!(" ({})", v))
            .unwrap_or_default();
        println!("  {:<12} template: {}{}", preset.name, preset.template, lang);
        if !preset.activate_plugins.is_empty() {
            println!(
                "  {:<12} plugins: {}",
                "",
                preset.activate_plugins.join(", ")
            );
        }
    }
    Ok(())
}
