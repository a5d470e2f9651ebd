//! HTML page model for specimen sites.
//!
//! Parses page sources into an arena [`Document`], answers the element
//! queries the synchronizer needs, audits pages against their selector
//! contract and serializes the tree back to HTML.

pub mod audit;
pub mod dom;
pub mod parser;
pub mod select;
pub mod serialize;

pub use audit::{audit_page, AuditIssue, AuditReport, Severity};
pub use dom::{Attr, Document, ElementData, NodeId, NodeKind};
pub use parser::{parse_html, ParseError, ParsedPage, ParseWarning};
pub use serialize::{to_html, SerializeOptions};
