//! Stylesheet pipeline: Sass compilation, prefixing, and compression.
//!
//! Sass always compiles to expanded CSS. The lightningcss pass then
//! adds vendor prefixes for the configured browser targets and, in
//! production, compresses the output.

use std::path::Path;

use lightningcss::rules::CssRule;
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

use crate::builder::BuildError;

/// Browser targets used when the site config does not set any.
pub const DEFAULT_TARGETS: &[&str] = &["last 2 versions", "> 0.5%"];

/// Compile a Sass entry point to expanded CSS.
pub fn compile_sass(entry: &Path) -> Result<String, BuildError> {
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);
    grass::from_path(entry, &options).map_err(|e| BuildError::StyleError(e.to_string()))
}

/// Run compiled CSS through lightningcss for prefixing and, when
/// `minify` is set, compression.
pub fn postprocess_css(css: &str, targets: &[String], minify: bool) -> Result<String, BuildError> {
    let browsers = Browsers::from_browserslist(targets)
        .map_err(|e| BuildError::StyleError(format!("invalid browser targets: {e}")))?;
    let targets = Targets {
        browsers,
        ..Targets::default()
    };

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| BuildError::StyleError(format!("CSS parse error: {e}")))?;
    // An @import surviving Sass compilation means an extra request per
    // page load; the stylesheet must inline everything.
    if stylesheet
        .rules
        .0
        .iter()
        .any(|rule| matches!(rule, CssRule::Import(_)))
    {
        return Err(BuildError::StyleError(
            "@import in compiled CSS; inline the stylesheet instead".to_string(),
        ));
    }
    let out = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| BuildError::StyleError(format!("CSS print error: {e}")))?;
    Ok(out.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(targets: &[&str]) -> Vec<String> {
        targets.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn sass_nesting_is_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("styles.scss");
        std::fs::write(
            &entry,
            "$ink: #1a1a1a;\n.stage {\n  h1 {\n    color: $ink;\n  }\n}\n",
        )
        .unwrap();

        let css = compile_sass(&entry).unwrap();
        assert!(css.contains(".stage h1"));
        assert!(css.contains("color: #1a1a1a"));
    }

    #[test]
    fn sass_errors_surface_as_style_errors() {
        let dir = tempfile::tempdir().unwrap();
        let entry = dir.path().join("styles.scss");
        std::fs::write(&entry, ".stage {\n  color: $missing;\n}\n").unwrap();

        let err = compile_sass(&entry).unwrap_err();
        assert!(matches!(err, BuildError::StyleError(_)));
    }

    #[test]
    fn development_output_keeps_formatting() {
        let css = postprocess_css(
            ".stage {\n  color: red;\n}\n",
            &owned(DEFAULT_TARGETS),
            false,
        )
        .unwrap();
        assert!(css.contains('\n'));
        assert!(css.contains("color: red"));
    }

    #[test]
    fn production_output_is_compressed() {
        let css = postprocess_css(
            ".stage {\n  color: red;\n}\n\n.caption {\n  color: blue;\n}\n",
            &owned(DEFAULT_TARGETS),
            true,
        )
        .unwrap();
        assert!(!css.contains('\n'));
        assert!(css.len() < ".stage{color:red}.caption{color:blue}".len() * 2);
    }

    #[test]
    fn old_browser_targets_add_vendor_prefixes() {
        let css = postprocess_css(
            ".stage { user-select: none; }",
            &owned(&["safari >= 9"]),
            false,
        )
        .unwrap();
        assert!(css.contains("-webkit-user-select"));
        assert!(css.contains("user-select: none"));
    }

    #[test]
    fn residual_imports_are_rejected() {
        let err = postprocess_css(
            "@import url(\"extra.css\");\n.stage { color: red; }",
            &owned(DEFAULT_TARGETS),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::StyleError(m) if m.contains("@import")));
    }

    #[test]
    fn unknown_browser_queries_are_rejected() {
        let err = postprocess_css(".stage { color: red; }", &owned(&["netscape 4"]), false)
            .unwrap_err();
        assert!(matches!(err, BuildError::StyleError(_)));
    }
}
