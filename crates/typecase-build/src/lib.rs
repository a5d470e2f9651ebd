//! Build pipeline for typecase sites.
//!
//! Turns a source tree of HTML pages, Sass, and scripts into a static
//! site with the dropdown runtime bundled in, reconciling each page's
//! stored variant state along the way.

pub mod builder;
pub mod page;
pub mod scaffold;
pub mod scripts;
pub mod styles;

pub use builder::{
    discover_pages, ensure_output_tree, BuildConfig, BuildError, BuildReport, Mode, SiteBuilder,
};
pub use page::{process_page, ProcessedPage};
pub use scaffold::scaffold_site;
pub use scripts::{bundle_scripts, lint_script, minify_script, LintFinding, ScriptBundle};
pub use styles::{compile_sass, postprocess_css, DEFAULT_TARGETS};
