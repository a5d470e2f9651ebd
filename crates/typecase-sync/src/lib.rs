//! Selection synchronization for specimen pages.
//!
//! A specimen page exposes three dropdowns (font version, style and weight).
//! The authoritative state lives in `data-*` attributes on a root element,
//! and every marker-classed element carries one variant class per field.
//! This crate keeps the two in step: [`Synchronizer`] reconciles any
//! [`VariantDom`] implementation, and [`sync_client_script`] emits the
//! browser runtime that performs the identical pass on the live page.

pub mod field;
pub mod normalize;
pub mod script;
pub mod spec;
pub mod synchronizer;
pub mod traits;

pub use field::{Field, PerField};
pub use normalize::normalize;
pub use script::sync_client_script;
pub use spec::{SelectorSpec, SpecError};
pub use synchronizer::Synchronizer;
pub use traits::{FieldChange, SelectEvent, SyncError, SyncReport, VariantDom};
