//! The synchronization pass over a bound document.

use crate::field::{Field, PerField};
use crate::normalize::normalize;
use crate::spec::SelectorSpec;
use crate::traits::{FieldChange, SelectEvent, SyncError, SyncReport, VariantDom};

/// Keeps a page's stored variant state in step with its dropdowns.
///
/// The stored state is the set of `data-*` attributes on the root element;
/// the visible state is one variant class per field on every updatable
/// element. A pass reads the dropdowns, re-reads the live attributes and
/// rewrites only the fields that differ, so running it twice in a row is
/// a no-op.
#[derive(Debug)]
pub struct Synchronizer<D: VariantDom> {
    dom: D,
    root: D::Handle,
    selects: PerField<D::Handle>,
    select_ids: PerField<String>,
    stored: PerField<Option<String>>,
    updatables: Vec<D::Handle>,
}

impl<D: VariantDom> Synchronizer<D> {
    /// Bind to a document: resolve the root and dropdown elements, snapshot
    /// the stored `data-*` state and capture the updatable element set.
    ///
    /// The updatable set is collected exactly once. Elements that gain the
    /// marker class later are never tracked; an empty set is fine and
    /// reduces passes to attribute bookkeeping. Binding performs no writes,
    /// call [`update`](Self::update) to reconcile.
    pub fn bind(dom: D, spec: &SelectorSpec) -> Result<Self, SyncError> {
        spec.validate()?;

        let root = dom
            .element_by_id(&spec.root)
            .ok_or_else(|| SyncError::MissingRoot {
                id: spec.root.clone(),
            })?;

        let selects = PerField::try_from_fn(|field| {
            let id = spec.select_id(field);
            dom.element_by_id(id).ok_or_else(|| SyncError::MissingSelect {
                field,
                id: id.to_string(),
            })
        })?;

        let select_ids = PerField::from_fn(|field| spec.select_id(field).to_string());
        let stored = PerField::from_fn(|field| dom.attribute(root, field.data_attr()));
        let updatables = dom.elements_with_class(&spec.marker);

        Ok(Self {
            dom,
            root,
            selects,
            select_ids,
            stored,
            updatables,
        })
    }

    /// Run one synchronization pass and report what changed.
    ///
    /// Dropdown values are normalized, the stored state is re-read from the
    /// live document rather than trusted from the last pass, and each field
    /// is reconciled independently. Fails before any write when a dropdown
    /// has no selected option.
    pub fn update(&mut self) -> Result<SyncReport, SyncError> {
        let selected = PerField::try_from_fn(|field| {
            self.dom
                .selected_value(self.selects[field])
                .map(|value| normalize(&value))
                .ok_or_else(|| SyncError::NoSelection {
                    field,
                    id: self.select_ids[field].clone(),
                })
        })?;

        // Re-read instead of trusting the snapshot, so attribute edits made
        // behind our back are absorbed rather than fought.
        self.stored = PerField::from_fn(|field| self.dom.attribute(self.root, field.data_attr()));

        let mut changes = Vec::new();
        for field in Field::ALL {
            let current = &selected[field];
            let previous = self.stored[field].clone();
            if previous.as_deref() == Some(current.as_str()) {
                continue;
            }
            self.apply(field, current, previous.as_deref());
            changes.push(FieldChange {
                field,
                previous,
                current: current.clone(),
            });
        }

        Ok(SyncReport { changes })
    }

    /// Entry point for dropdown events. Change and blur both land here and
    /// trigger the same pass.
    pub fn handle_event(&mut self, event: SelectEvent) -> Result<SyncReport, SyncError> {
        match event {
            SelectEvent::Changed | SelectEvent::Blurred => self.update(),
        }
    }

    /// Write one field: the attribute first, then the new class on every
    /// updatable element before the old class comes off, so no element is
    /// ever without a variant class for the field.
    fn apply(&mut self, field: Field, current: &str, previous: Option<&str>) {
        self.dom.set_attribute(self.root, field.data_attr(), current);

        for &element in &self.updatables {
            self.dom.add_class(element, current);
        }
        if let Some(previous) = previous {
            for &element in &self.updatables {
                self.dom.remove_class(element, previous);
            }
        }

        // Snapshot what actually landed, not what we meant to write.
        self.stored[field] = self.dom.attribute(self.root, field.data_attr());
    }

    /// Stored value for a field as of the last bind or pass.
    pub fn stored(&self, field: Field) -> Option<&str> {
        self.stored[field].as_deref()
    }

    /// Number of elements captured into the updatable set at bind time.
    pub fn updatable_count(&self) -> usize {
        self.updatables.len()
    }

    /// Shared access to the bound document.
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Mutable access, for callers that interleave their own document work
    /// between passes.
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Consume the synchronizer and hand the document back.
    pub fn into_dom(self) -> D {
        self.dom
    }
}
