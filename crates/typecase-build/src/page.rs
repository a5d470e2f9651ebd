//! Per-page processing: parse, audit, reconcile, serialize.

use std::path::Path;

use typecase_page::audit::{audit_page, AuditReport};
use typecase_page::parser::parse_html;
use typecase_page::serialize::{to_html, SerializeOptions};
use typecase_sync::{SelectorSpec, Synchronizer};

use crate::builder::BuildError;

/// The outcome of processing one HTML page.
#[derive(Debug, Clone)]
pub struct ProcessedPage {
    /// Serialized output, empty when the audit found errors.
    pub html: String,
    pub report: AuditReport,
    /// Fields whose stored state was rewritten to match the dropdowns.
    pub reconciled: usize,
}

/// Parse a page, audit it, reconcile stored state with the dropdown
/// selections, and serialize the result with comments stripped.
///
/// The audit runs on the tree as authored so issue lines point at the
/// source file. A page with audit errors is returned unserialized;
/// the caller decides whether warnings alone fail the build.
pub fn process_page(
    path: &Path,
    source: &str,
    spec: &SelectorSpec,
) -> Result<ProcessedPage, BuildError> {
    let parsed = parse_html(source).map_err(|e| BuildError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let report = audit_page(&parsed.document, spec, &parsed.warnings);
    if report.error_count() > 0 {
        return Ok(ProcessedPage {
            html: String::new(),
            report,
            reconciled: 0,
        });
    }

    let sync_failed = |e: typecase_sync::SyncError| BuildError::SyncError {
        path: path.display().to_string(),
        message: e.to_string(),
    };
    let mut synchronizer = Synchronizer::bind(parsed.document, spec).map_err(sync_failed)?;
    let changes = synchronizer.update().map_err(sync_failed)?;

    let document = synchronizer.into_dom();
    let html = to_html(
        &document,
        &SerializeOptions {
            strip_comments: true,
        },
    );

    Ok(ProcessedPage {
        html,
        report,
        reconciled: changes.changes.len(),
    })
}
