//! Static page audit.
//!
//! Checks a parsed page for markup defects, accessibility gaps and holes
//! in the selector contract the synchronizer depends on. Everything runs
//! locally on the tree, so builds stay offline and deterministic.

use std::collections::HashSet;

use typecase_sync::{normalize, Field, SelectorSpec};

use crate::dom::{Document, NodeId, NodeKind};
use crate::parser::ParseWarning;

/// How bad a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The page breaks its contract; the build should fail.
    Error,
    /// Worth fixing; fails the build only in strict mode.
    Warning,
}

/// A single audit finding.
#[derive(Debug, Clone)]
pub struct AuditIssue {
    pub severity: Severity,

    /// 1-based source line, when the finding maps to one.
    pub line: Option<usize>,

    /// Check category: `markup`, `structure`, `contract` or `a11y`.
    pub check: &'static str,

    pub message: String,
}

/// Everything the audit found on one page.
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// True when nothing at all was flagged.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// True when the page passes: no errors, and no warnings either when
    /// `strict` is set.
    pub fn passes(&self, strict: bool) -> bool {
        self.error_count() == 0 && (!strict || self.warning_count() == 0)
    }

    fn error(&mut self, check: &'static str, line: Option<usize>, message: String) {
        self.issues.push(AuditIssue {
            severity: Severity::Error,
            line,
            check,
            message,
        });
    }

    fn warning(&mut self, check: &'static str, line: Option<usize>, message: String) {
        self.issues.push(AuditIssue {
            severity: Severity::Warning,
            line,
            check,
            message,
        });
    }
}

/// Audit a parsed page against its selector contract.
pub fn audit_page(
    document: &Document,
    spec: &SelectorSpec,
    parse_warnings: &[ParseWarning],
) -> AuditReport {
    let mut report = AuditReport::default();

    for warning in parse_warnings {
        report.warning("markup", Some(warning.line), warning.message.clone());
    }

    check_structure(document, &mut report);
    check_contract(document, spec, &mut report);
    check_accessibility(document, &mut report);

    report
}

fn check_structure(document: &Document, report: &mut AuditReport) {
    let has_doctype = document
        .roots()
        .iter()
        .any(|&id| matches!(document.kind(id), NodeKind::Doctype(_)));
    if !has_doctype {
        report.warning("structure", None, "page has no doctype".to_string());
    }

    let html_count = document.elements_named("html").len();
    if html_count != 1 {
        report.warning(
            "structure",
            None,
            format!("expected one <html> element, found {html_count}"),
        );
    }

    let has_title = document
        .elements_named("title")
        .iter()
        .any(|&id| !document.text_of(id).trim().is_empty());
    if !has_title {
        report.warning("structure", None, "page has no non-empty <title>".to_string());
    }

    // Duplicate ids break id lookup, which takes the first match.
    let mut seen: HashSet<&str> = HashSet::new();
    for node in document.descendants() {
        let Some(id) = document.element(node).and_then(|el| el.attribute("id")) else {
            continue;
        };
        if !seen.insert(id) {
            report.error(
                "structure",
                Some(document.line(node)),
                format!("duplicate id \"{id}\""),
            );
        }
    }

    for &label in &document.elements_named("label") {
        let Some(target) = document.element(label).and_then(|el| el.attribute("for")) else {
            continue;
        };
        if !seen.contains(target) {
            report.error(
                "structure",
                Some(document.line(label)),
                format!("label for=\"{target}\" matches no element id"),
            );
        }
    }
}

fn check_contract(document: &Document, spec: &SelectorSpec, report: &mut AuditReport) {
    let root = document.element_by_id(&spec.root);
    if root.is_none() {
        report.error(
            "contract",
            None,
            format!("root element #{} not found", spec.root),
        );
    }

    for field in Field::ALL {
        let id = spec.select_id(field);
        match document.element_by_id(id) {
            None => report.error(
                "contract",
                None,
                format!("{field} dropdown #{id} not found"),
            ),
            Some(select) => {
                if document.selected_value(select).is_none() {
                    report.error(
                        "contract",
                        Some(document.line(select)),
                        format!("{field} dropdown #{id} has no options"),
                    );
                }
            }
        }
    }

    if let Some(root) = root {
        check_stored_state(document, root, report);
    }

    if document.elements_with_class(&spec.marker).is_empty() {
        report.warning(
            "contract",
            None,
            format!("no element carries the \"{}\" marker class", spec.marker),
        );
    }
}

/// Stored values double as class tokens, so they must already be in
/// normalized form; anything else would never match a dropdown value.
fn check_stored_state(document: &Document, root: NodeId, report: &mut AuditReport) {
    let Some(el) = document.element(root) else {
        return;
    };
    for field in Field::ALL {
        let Some(value) = el.attribute(field.data_attr()) else {
            continue;
        };
        if value != normalize(value) {
            report.warning(
                "contract",
                Some(document.line(root)),
                format!(
                    "stored {} value \"{value}\" is not normalized",
                    field.data_attr()
                ),
            );
        }
    }
}

fn check_accessibility(document: &Document, report: &mut AuditReport) {
    for &html in &document.elements_named("html") {
        let lang = document
            .element(html)
            .and_then(|el| el.attribute("lang"))
            .unwrap_or("");
        if lang.is_empty() {
            report.warning(
                "a11y",
                Some(document.line(html)),
                "<html> has no lang attribute".to_string(),
            );
        }
    }

    for &img in &document.elements_named("img") {
        let alt_present = document
            .element(img)
            .is_some_and(|el| el.has_attribute("alt"));
        if !alt_present {
            report.warning(
                "a11y",
                Some(document.line(img)),
                "<img> has no alt text".to_string(),
            );
        }
    }

    let mut last_heading: Option<u8> = None;
    for node in document.descendants() {
        let Some(el) = document.element(node) else {
            continue;
        };
        let level = match el.name.as_str() {
            "h1" => 1,
            "h2" => 2,
            "h3" => 3,
            "h4" => 4,
            "h5" => 5,
            "h6" => 6,
            _ => continue,
        };
        if let Some(last) = last_heading {
            if level > last + 1 {
                report.warning(
                    "a11y",
                    Some(document.line(node)),
                    format!("heading level jumps from h{last} to h{level}"),
                );
            }
        }
        last_heading = Some(level);
    }

    for &anchor in &document.elements_named("a") {
        let Some(el) = document.element(anchor) else {
            continue;
        };
        if el.attribute("aria-label").is_some_and(|v| !v.is_empty()) {
            continue;
        }
        if document.text_of(anchor).trim().is_empty() {
            report.warning(
                "a11y",
                Some(document.line(anchor)),
                "<a> has no link text".to_string(),
            );
        }
    }

    // A dropdown needs an accessible name: a <label for=...> or aria-label.
    let labeled: HashSet<&str> = document
        .elements_named("label")
        .iter()
        .filter_map(|&label| document.element(label).and_then(|el| el.attribute("for")))
        .collect();
    for &select in &document.elements_named("select") {
        let Some(el) = document.element(select) else {
            continue;
        };
        if el.attribute("aria-label").is_some_and(|v| !v.is_empty()) {
            continue;
        }
        let named = el.attribute("id").is_some_and(|id| labeled.contains(id));
        if !named {
            report.warning(
                "a11y",
                Some(document.line(select)),
                match el.attribute("id") {
                    Some(id) => format!("<select id=\"{id}\"> has no label"),
                    None => "<select> has no label".to_string(),
                },
            );
        }
    }
}
