//! Initialize a specimen site in a project.

use std::path::Path;

use anyhow::Result;
use typecase_build::scaffold_site;
use typecase_sync::SelectorSpec;

/// Run the init command.
pub async fn run(title: &str, yes: bool) -> Result<()> {
    tracing::info!("Initializing typecase site...");

    let root = Path::new(".");

    // An existing config means the site is already set up
    if root.join("typecase.toml").exists() && !yes {
        tracing::warn!("typecase.toml already exists. Use --yes to fill in missing files.");
        return Ok(());
    }

    let created = scaffold_site(root, title, &SelectorSpec::default())?;
    for path in &created {
        tracing::info!("Created {}", path.display());
    }
    if created.is_empty() {
        tracing::info!("Every file is already in place, nothing to do.");
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'typecase dev' to start the development server.");

    Ok(())
}
