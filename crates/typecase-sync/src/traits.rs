//! The document capability seam and synchronization result types.

use crate::field::Field;

/// Query and mutation capability over a host document.
///
/// [`Synchronizer`](crate::Synchronizer) is written against this trait so
/// the static page model, a live browser document, or a test double can
/// all back it. Handles are resolved once at bind time and must stay valid
/// for the lifetime of the document.
pub trait VariantDom {
    /// Opaque element handle.
    type Handle: Copy + Eq;

    /// First element with the given id, in document order.
    fn element_by_id(&self, id: &str) -> Option<Self::Handle>;

    /// Every element carrying `class`, in document order.
    fn elements_with_class(&self, class: &str) -> Vec<Self::Handle>;

    /// Attribute value on an element, `None` when absent.
    fn attribute(&self, element: Self::Handle, name: &str) -> Option<String>;

    /// Set an attribute, replacing any existing value.
    fn set_attribute(&mut self, element: Self::Handle, name: &str, value: &str);

    /// Value of the currently chosen option of a select element, `None`
    /// when the element has no options to choose from.
    fn selected_value(&self, element: Self::Handle) -> Option<String>;

    /// Add a class token; adding a token already present is a no-op.
    fn add_class(&mut self, element: Self::Handle, class: &str);

    /// Remove a class token; removing an absent token is a no-op.
    fn remove_class(&mut self, element: Self::Handle, class: &str);
}

/// An event observed on one of the page's dropdowns.
///
/// Change fires when an option is picked; blur covers mobile browsers that
/// only commit the choice once the control loses focus. Both funnel into
/// the same idempotent pass, so double-firing is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectEvent {
    Changed,
    Blurred,
}

/// One field rewrite performed by a synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Field that was out of step.
    pub field: Field,

    /// Stored value before the pass; `None` when the attribute was absent.
    pub previous: Option<String>,

    /// Normalized dropdown value now stored on the page.
    pub current: String,
}

/// Outcome of one synchronization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Rewrites performed, in `Field::ALL` order; empty when the page was
    /// already in step.
    pub changes: Vec<FieldChange>,
}

impl SyncReport {
    /// True when the pass found nothing to rewrite.
    pub fn in_sync(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Errors raised while binding to or updating a document.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Root element #{id} not found")]
    MissingRoot { id: String },

    #[error("Dropdown #{id} for field {field} not found")]
    MissingSelect { field: Field, id: String },

    #[error("Dropdown #{id} for field {field} has no selected option")]
    NoSelection { field: Field, id: String },

    #[error(transparent)]
    Spec(#[from] crate::spec::SpecError),
}
