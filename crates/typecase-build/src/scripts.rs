//! JavaScript bundling for the asset pipeline.
//!
//! Every `.js` file under the source tree is linted with a real parser,
//! then concatenated into a single bundle with the generated dropdown
//! runtime appended last. Production builds minify the result.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use walkdir::WalkDir;

use crate::builder::BuildError;

/// A single problem reported by the JavaScript linter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub path: PathBuf,
    pub message: String,
}

/// The concatenated script bundle for one build.
#[derive(Debug, Clone)]
pub struct ScriptBundle {
    /// Concatenated source, runtime last.
    pub code: String,
    /// Author scripts that went into the bundle, in bundle order.
    pub scripts: Vec<PathBuf>,
    /// Lint findings across all author scripts.
    pub findings: Vec<LintFinding>,
}

/// Parse one script and report every syntax error the parser found.
pub fn lint_script(path: &Path, source: &str) -> Vec<LintFinding> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::cjs()).parse();
    ret.errors
        .iter()
        .map(|e| LintFinding {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
        .collect()
}

/// All `.js` files under `js_dir`, sorted for a stable bundle order.
pub fn discover_scripts(js_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut scripts = Vec::new();
    for entry in WalkDir::new(js_dir).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::ReadError(e.to_string()))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "js") {
            scripts.push(path.to_path_buf());
        }
    }
    scripts.sort();
    Ok(scripts)
}

/// Lint and concatenate every author script, then append the generated
/// runtime. The runtime is our own output and is not linted.
pub fn bundle_scripts(js_dir: &Path, runtime: &str) -> Result<ScriptBundle, BuildError> {
    let scripts = if js_dir.is_dir() {
        discover_scripts(js_dir)?
    } else {
        Vec::new()
    };

    let mut code = String::new();
    let mut findings = Vec::new();
    for path in &scripts {
        let source = std::fs::read_to_string(path)
            .map_err(|e| BuildError::ReadError(format!("{}: {e}", path.display())))?;
        findings.extend(lint_script(path, &source));
        code.push_str(&source);
        if !source.ends_with('\n') {
            code.push('\n');
        }
    }
    code.push_str(runtime);

    Ok(ScriptBundle {
        code,
        scripts,
        findings,
    })
}

/// Minify a bundle for production output.
pub fn minify_script(code: &str) -> Result<String, BuildError> {
    let session = minify_js::Session::new();
    let mut out = Vec::new();
    minify_js::minify(
        &session,
        minify_js::TopLevelMode::Global,
        code.as_bytes(),
        &mut out,
    )
    .map_err(|e| BuildError::MinifyError(format!("{e:?}")))?;
    String::from_utf8(out).map_err(|e| BuildError::MinifyError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_script_has_no_findings() {
        let findings = lint_script(
            Path::new("site.js"),
            "(function () {\n  'use strict';\n  var x = 1;\n}());\n",
        );
        assert_eq!(findings, Vec::new());
    }

    #[test]
    fn broken_script_reports_findings() {
        let findings = lint_script(Path::new("broken.js"), "function ( {");
        assert!(!findings.is_empty());
        assert!(findings.iter().all(|f| f.path == Path::new("broken.js")));
    }

    #[test]
    fn scripts_are_discovered_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("widgets")).unwrap();
        std::fs::write(dir.path().join("zebra.js"), "var z = 1;\n").unwrap();
        std::fs::write(dir.path().join("widgets/menu.js"), "var m = 1;\n").unwrap();
        std::fs::write(dir.path().join("alpha.js"), "var a = 1;\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a script").unwrap();

        let scripts = discover_scripts(dir.path()).unwrap();
        let names: Vec<_> = scripts
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("alpha.js"),
                PathBuf::from("widgets/menu.js"),
                PathBuf::from("zebra.js"),
            ]
        );
    }

    #[test]
    fn bundle_appends_runtime_after_author_scripts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.js"), "var site = true;").unwrap();

        let bundle = bundle_scripts(dir.path(), "(function () { var runtime = true; }());\n")
            .unwrap();
        assert!(bundle.findings.is_empty());
        assert_eq!(bundle.scripts.len(), 1);
        let site = bundle.code.find("var site").unwrap();
        let runtime = bundle.code.find("var runtime").unwrap();
        assert!(site < runtime);
        assert!(bundle.code.ends_with("}());\n"));
    }

    #[test]
    fn missing_source_dir_still_yields_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = bundle_scripts(&dir.path().join("js"), "var runtime = 1;\n").unwrap();
        assert_eq!(bundle.scripts, Vec::<PathBuf>::new());
        assert_eq!(bundle.code, "var runtime = 1;\n");
    }

    #[test]
    fn minified_bundle_is_smaller() {
        let code = "(function () {\n  'use strict';\n  var greeting = 'hello';\n  \
                    var target = 'world';\n  console.log(greeting + ' ' + target);\n}());\n";
        let minified = minify_script(code).unwrap();
        assert!(minified.len() < code.len());
        assert!(!minified.contains("  "));
    }
}
