//! Site builder: drives the whole pipeline for one build.
//!
//! A build lints and bundles the scripts, compiles the stylesheet,
//! audits and reconciles every page, and copies static assets into the
//! fixed output tree. Development builds keep everything readable;
//! production builds minify the bundle and compress the CSS.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use typecase_page::audit::Severity;
use typecase_sync::{sync_client_script, SelectorSpec, SpecError};

use crate::page::process_page;
use crate::scripts::{bundle_scripts, minify_script};
use crate::styles::{compile_sass, postprocess_css, DEFAULT_TARGETS};

/// Build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Readable output for local iteration.
    Dev,
    /// Minified scripts and compressed CSS.
    Prod,
}

impl Mode {
    pub fn minifies(self) -> bool {
        matches!(self, Mode::Prod)
    }
}

/// Configuration for building a site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source directory holding html/, js/, scss/, fonts/, image/
    pub src_dir: PathBuf,

    /// Output directory
    pub out_dir: PathBuf,

    /// Build mode
    pub mode: Mode,

    /// Element ids and classes the dropdown runtime is wired to
    pub selectors: SelectorSpec,

    /// Stylesheet entry point, relative to the source directory
    pub style_entry: PathBuf,

    /// Browserslist queries for vendor prefixing
    pub targets: Vec<String>,

    /// Treat audit warnings as build failures
    pub strict: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("site"),
            mode: Mode::Dev,
            selectors: SelectorSpec::default(),
            style_entry: PathBuf::from("scss/main.scss"),
            targets: DEFAULT_TARGETS.iter().map(|t| t.to_string()).collect(),
            strict: false,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of pages written
    pub pages: usize,

    /// Number of author scripts bundled
    pub scripts: usize,

    /// Number of static asset files copied
    pub assets: usize,

    /// Fields rewritten while reconciling pages
    pub reconciled: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub out_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read source: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to parse page: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("JavaScript lint failed with {0} finding(s)")]
    LintError(usize),

    #[error("Stylesheet pipeline failed: {0}")]
    StyleError(String),

    #[error("Failed to minify bundle: {0}")]
    MinifyError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to reconcile page: {path}: {message}")]
    SyncError { path: String, message: String },

    #[error("Audit failed for {path}: {errors} error(s), {warnings} warning(s)")]
    AuditError {
        path: String,
        errors: usize,
        warnings: usize,
    },

    #[error("Invalid selector config: {0}")]
    SpecError(#[from] SpecError),
}

/// Static site builder.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run a full build into the output directory.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        tracing::info!("Building site from {}", self.config.src_dir.display());

        self.config.selectors.validate()?;
        ensure_output_tree(&self.config.out_dir)?;

        let scripts = self.build_scripts()?;
        self.build_styles()?;
        let (pages, reconciled) = self.build_pages()?;
        let assets = self.copy_static_assets()?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Built {} page(s), {} script(s), {} asset(s) in {}ms",
            pages,
            scripts,
            assets,
            duration_ms
        );

        Ok(BuildReport {
            pages,
            scripts,
            assets,
            reconciled,
            duration_ms,
            out_dir: self.config.out_dir.clone(),
        })
    }

    /// Lint, bundle, and write the script output with the generated
    /// dropdown runtime appended.
    fn build_scripts(&self) -> Result<usize, BuildError> {
        let runtime = sync_client_script(&self.config.selectors);
        let bundle = bundle_scripts(&self.config.src_dir.join("js"), &runtime)?;

        if !bundle.findings.is_empty() {
            for finding in &bundle.findings {
                tracing::error!("{}: {}", finding.path.display(), finding.message);
            }
            return Err(BuildError::LintError(bundle.findings.len()));
        }

        let code = if self.config.mode.minifies() {
            minify_script(&bundle.code)?
        } else {
            bundle.code
        };
        write_file(&self.config.out_dir.join("assets/js/s.js"), &code)?;
        Ok(bundle.scripts.len())
    }

    fn build_styles(&self) -> Result<(), BuildError> {
        let entry = self.config.src_dir.join(&self.config.style_entry);
        let css = if entry.is_file() {
            compile_sass(&entry)?
        } else {
            tracing::warn!("No stylesheet entry at {}", entry.display());
            String::new()
        };
        let css = postprocess_css(&css, &self.config.targets, self.config.mode.minifies())?;
        write_file(&self.config.out_dir.join("assets/css/styles.css"), &css)
    }

    /// Audit and reconcile every page under the html source directory.
    fn build_pages(&self) -> Result<(usize, usize), BuildError> {
        let mut pages = 0;
        let mut reconciled = 0;
        for path in discover_pages(&self.config.src_dir.join("html"))? {
            let source = fs::read_to_string(&path)
                .map_err(|e| BuildError::ReadError(format!("{}: {e}", path.display())))?;
            let processed = process_page(&path, &source, &self.config.selectors)?;

            for issue in &processed.report.issues {
                let location = match issue.line {
                    Some(line) => format!("{}:{line}", path.display()),
                    None => path.display().to_string(),
                };
                match issue.severity {
                    Severity::Error => {
                        tracing::error!("{location}: [{}] {}", issue.check, issue.message);
                    }
                    Severity::Warning => {
                        tracing::warn!("{location}: [{}] {}", issue.check, issue.message);
                    }
                }
            }
            if !processed.report.passes(self.config.strict) {
                return Err(BuildError::AuditError {
                    path: path.display().to_string(),
                    errors: processed.report.error_count(),
                    warnings: processed.report.warning_count(),
                });
            }
            if processed.reconciled > 0 {
                tracing::info!(
                    "{}: reconciled {} field(s) to the dropdown state",
                    path.display(),
                    processed.reconciled
                );
            }

            let Some(name) = path.file_name() else {
                continue;
            };
            write_file(&self.config.out_dir.join(name), &processed.html)?;
            pages += 1;
            reconciled += processed.reconciled;
        }
        Ok((pages, reconciled))
    }

    fn copy_static_assets(&self) -> Result<usize, BuildError> {
        let mut copied = 0;
        copied += copy_tree(
            &self.config.src_dir.join("fonts"),
            &self.config.out_dir.join("assets/fonts"),
        )?;
        copied += copy_tree(
            &self.config.src_dir.join("image"),
            &self.config.out_dir.join("assets/image"),
        )?;
        Ok(copied)
    }
}

/// HTML pages in the given directory, sorted by name.
pub fn discover_pages(html_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let entries = fs::read_dir(html_dir)
        .map_err(|e| BuildError::ReadError(format!("{}: {e}", html_dir.display())))?;
    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "html") {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

/// Create the fixed output tree, returning the directories that were
/// actually created.
pub fn ensure_output_tree(out_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut created = Vec::new();
    for sub in ["assets/css", "assets/fonts", "assets/image", "assets/js"] {
        let dir = out_dir.join(sub);
        if !dir.is_dir() {
            fs::create_dir_all(&dir)
                .map_err(|e| BuildError::WriteError(format!("{}: {e}", dir.display())))?;
            created.push(dir);
        }
    }
    Ok(created)
}

pub(crate) fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BuildError::WriteError(format!("{}: {e}", parent.display())))?;
    }
    fs::write(path, contents)
        .map_err(|e| BuildError::WriteError(format!("{}: {e}", path.display())))
}

fn copy_tree(from: &Path, to: &Path) -> Result<usize, BuildError> {
    if !from.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let dest = to.join(path.strip_prefix(from).unwrap_or(path));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BuildError::WriteError(format!("{}: {e}", parent.display())))?;
        }
        fs::copy(path, &dest)
            .map_err(|e| BuildError::WriteError(format!("{}: {e}", dest.display())))?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::scaffold_site;
    use pretty_assertions::assert_eq;

    fn config(root: &Path, mode: Mode) -> BuildConfig {
        BuildConfig {
            src_dir: root.join("src"),
            out_dir: root.join("site"),
            mode,
            ..BuildConfig::default()
        }
    }

    fn scaffolded(root: &Path) {
        scaffold_site(root, "Specimen", &SelectorSpec::default()).unwrap();
    }

    #[tokio::test]
    async fn builds_a_full_site() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());

        let builder = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        let report = builder.build().await.unwrap();
        assert_eq!(report.pages, 1);
        assert_eq!(report.scripts, 1);

        let html = fs::read_to_string(tmp.path().join("site/index.html")).unwrap();
        assert!(html.contains(r#"data-version="display""#));
        assert!(!html.contains("<!--"));

        let js = fs::read_to_string(tmp.path().join("site/assets/js/s.js")).unwrap();
        assert!(js.contains("selector-version"));
        assert!(js.contains("update();"));

        let css = fs::read_to_string(tmp.path().join("site/assets/css/styles.css")).unwrap();
        assert!(css.contains(".roman"));
        assert!(css.contains('\n'));
    }

    #[tokio::test]
    async fn production_minifies_scripts_and_compresses_css() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());

        let dev = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        dev.build().await.unwrap();
        let dev_js = fs::read_to_string(tmp.path().join("site/assets/js/s.js")).unwrap();

        let mut prod_config = config(tmp.path(), Mode::Prod);
        prod_config.out_dir = tmp.path().join("dist");
        let prod = SiteBuilder::new(prod_config);
        prod.build().await.unwrap();

        let prod_js = fs::read_to_string(tmp.path().join("dist/assets/js/s.js")).unwrap();
        assert!(prod_js.len() < dev_js.len());

        let css = fs::read_to_string(tmp.path().join("dist/assets/css/styles.css")).unwrap();
        assert!(!css.contains('\n'));
    }

    #[tokio::test]
    async fn lint_findings_fail_the_build() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());
        fs::write(tmp.path().join("src/js/broken.js"), "function ( {").unwrap();

        let builder = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        let err = builder.build().await.unwrap_err();
        assert!(matches!(err, BuildError::LintError(n) if n > 0));
    }

    #[tokio::test]
    async fn audit_errors_fail_the_build() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());
        let index = tmp.path().join("src/html/index.html");
        let html = fs::read_to_string(&index).unwrap();
        fs::write(&index, html.replace(r#"id="body""#, r#"id="stage""#)).unwrap();

        let builder = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        let err = builder.build().await.unwrap_err();
        match err {
            BuildError::AuditError { errors, .. } => assert!(errors > 0),
            other => panic!("expected an audit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn strict_mode_turns_warnings_into_failures() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());
        let index = tmp.path().join("src/html/index.html");
        let html = fs::read_to_string(&index).unwrap();
        fs::write(&index, html.replace(r#"<html lang="en">"#, "<html>")).unwrap();

        let relaxed = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        relaxed.build().await.unwrap();

        let mut strict_config = config(tmp.path(), Mode::Dev);
        strict_config.strict = true;
        let strict = SiteBuilder::new(strict_config);
        let err = strict.build().await.unwrap_err();
        match err {
            BuildError::AuditError { errors, warnings, .. } => {
                assert_eq!(errors, 0);
                assert!(warnings > 0);
            }
            other => panic!("expected an audit error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_stored_state_is_reconciled_at_build_time() {
        let tmp = tempfile::tempdir().unwrap();
        scaffolded(tmp.path());
        let index = tmp.path().join("src/html/index.html");
        let html = fs::read_to_string(&index).unwrap();
        fs::write(
            &index,
            html.replace(r#"data-weight="regular""#, r#"data-weight="light""#),
        )
        .unwrap();

        let builder = SiteBuilder::new(config(tmp.path(), Mode::Dev));
        let report = builder.build().await.unwrap();
        assert_eq!(report.reconciled, 1);

        let built = fs::read_to_string(tmp.path().join("site/index.html")).unwrap();
        assert!(built.contains(r#"data-weight="regular""#));
    }
}
