//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use typecase_build::{BuildConfig, Mode, SiteBuilder, DEFAULT_TARGETS};
use typecase_sync::SelectorSpec;

/// Configuration file structure (typecase.toml).
#[derive(Debug, Deserialize, Default)]
pub(crate) struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    #[serde(default)]
    selectors: SelectorSpec,
    #[serde(default)]
    styles: StylesSection,
    #[serde(default)]
    build: BuildSettings,
}

#[derive(Debug, Deserialize)]
struct SiteSection {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default = "default_src")]
    src: String,
    #[serde(default = "default_out")]
    out: String,
}

#[derive(Debug, Deserialize)]
struct StylesSection {
    /// Stylesheet entry point, relative to the source directory
    #[serde(default = "default_entry")]
    entry: String,
    /// Browserslist queries for vendor prefixing
    #[serde(default = "default_targets")]
    targets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_minify")]
    minify: bool,
    #[serde(default)]
    strict: bool,
}

fn default_title() -> String {
    "Specimen".to_string()
}
fn default_src() -> String {
    "src".to_string()
}
fn default_out() -> String {
    "site".to_string()
}
fn default_entry() -> String {
    "scss/main.scss".to_string()
}
fn default_targets() -> Vec<String> {
    DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect()
}
fn default_minify() -> bool {
    true
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: default_title(),
            src: default_src(),
            out: default_out(),
        }
    }
}

impl Default for StylesSection {
    fn default() -> Self {
        Self {
            entry: default_entry(),
            targets: default_targets(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
            strict: false,
        }
    }
}

impl ConfigFile {
    /// Map the file settings onto a build configuration.
    pub(crate) fn build_config(&self, mode: Mode) -> BuildConfig {
        BuildConfig {
            src_dir: PathBuf::from(&self.site.src),
            out_dir: PathBuf::from(&self.site.out),
            mode,
            selectors: self.selectors.clone(),
            style_entry: PathBuf::from(&self.styles.entry),
            targets: self.styles.targets.clone(),
            strict: self.build.strict,
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub(crate) fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    let file_config = load_config(config_path)?;

    tracing::info!("Building {}...", file_config.site.title);

    let mode = if minify.unwrap_or(file_config.build.minify) {
        Mode::Prod
    } else {
        Mode::Dev
    };

    let mut config = file_config.build_config(mode);
    if let Some(output) = output {
        config.out_dir = output;
    }

    let report = SiteBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} page(s), {} script(s) and {} asset file(s) in {}ms",
        report.pages,
        report.scripts,
        report.assets,
        report.duration_ms
    );
    if report.reconciled > 0 {
        tracing::info!("Reconciled {} stale stored field(s)", report.reconciled);
    }

    tracing::info!("Output: {}", report.out_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = load_config(&tmp.path().join("typecase.toml")).unwrap();

        assert_eq!(config.site.src, "src");
        assert_eq!(config.site.out, "site");
        assert_eq!(config.styles.entry, "scss/main.scss");
        assert!(config.build.minify);
        assert!(!config.build.strict);
    }

    #[test]
    fn sections_may_be_omitted() {
        let config: ConfigFile = toml::from_str("[site]\ntitle = \"Grade\"\n").unwrap();

        assert_eq!(config.site.title, "Grade");
        assert_eq!(config.site.src, "src");
        assert_eq!(config.selectors.root, "body");
        assert_eq!(config.styles.targets, default_targets());
    }

    #[test]
    fn settings_flow_into_the_build_config() {
        let source = r#"
[site]
src = "pages"
out = "public"

[selectors]
root = "stage"

[styles]
entry = "scss/site.scss"
targets = ["last 1 version"]

[build]
strict = true
"#;
        let config: ConfigFile = toml::from_str(source).unwrap();
        let build = config.build_config(Mode::Prod);

        assert_eq!(build.src_dir, PathBuf::from("pages"));
        assert_eq!(build.out_dir, PathBuf::from("public"));
        assert_eq!(build.mode, Mode::Prod);
        assert_eq!(build.selectors.root, "stage");
        assert_eq!(build.selectors.marker, "js-modifiable");
        assert_eq!(build.style_entry, PathBuf::from("scss/site.scss"));
        assert_eq!(build.targets, vec!["last 1 version".to_string()]);
        assert!(build.strict);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("typecase.toml");
        fs::write(&path, "[site\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn scaffolded_config_matches_the_build_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        typecase_build::scaffold_site(tmp.path(), "Specimen", &SelectorSpec::default()).unwrap();

        let config = load_config(&tmp.path().join("typecase.toml")).unwrap();
        let build = config.build_config(Mode::Dev);
        let defaults = BuildConfig::default();

        assert_eq!(config.site.title, "Specimen");
        assert_eq!(build.src_dir, defaults.src_dir);
        assert_eq!(build.out_dir, defaults.out_dir);
        assert_eq!(build.selectors, defaults.selectors);
        assert_eq!(build.style_entry, defaults.style_entry);
        assert_eq!(build.targets, defaults.targets);
        assert_eq!(build.strict, defaults.strict);
    }
}
