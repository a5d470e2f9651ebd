//! Element queries and the synchronizer seam.
//!
//! [`Document`] implements [`VariantDom`], so a parsed page can be bound
//! and reconciled by `typecase_sync::Synchronizer` exactly like a live
//! browser document.

use typecase_sync::VariantDom;

use crate::dom::{Document, NodeId};

impl Document {
    /// First element with the given id, in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants().find(|&node| {
            self.element(node)
                .is_some_and(|el| el.attribute("id") == Some(id))
        })
    }

    /// Every element carrying the class, in document order.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants()
            .filter(|&node| self.element(node).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    /// Every element with the tag name, in document order.
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.descendants()
            .filter(|&node| self.element(node).is_some_and(|el| el.name == name))
            .collect()
    }

    /// The value a select element currently has chosen: the first option
    /// flagged `selected`, falling back to the first option. An option's
    /// value is its `value` attribute, falling back to its trimmed text.
    /// `None` when the element has no options at all.
    pub fn selected_value(&self, select: NodeId) -> Option<String> {
        let options: Vec<NodeId> = self
            .descendants_of(select)
            .filter(|&node| self.element(node).is_some_and(|el| el.name == "option"))
            .collect();
        let chosen = options
            .iter()
            .copied()
            .find(|&option| {
                self.element(option)
                    .is_some_and(|el| el.has_attribute("selected"))
            })
            .or_else(|| options.first().copied())?;
        Some(self.option_value(chosen))
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|el| el.attribute("value")) {
            Some(value) => value.to_string(),
            None => self.text_of(option).trim().to_string(),
        }
    }
}

impl VariantDom for Document {
    type Handle = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        Document::element_by_id(self, id)
    }

    fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        Document::elements_with_class(self, class)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<String> {
        self.element(element)
            .and_then(|el| el.attribute(name))
            .map(str::to_string)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(element) {
            el.set_attribute(name, value);
        }
    }

    fn selected_value(&self, element: NodeId) -> Option<String> {
        Document::selected_value(self, element)
    }

    fn add_class(&mut self, element: NodeId, class: &str) {
        if let Some(el) = self.element_mut(element) {
            el.add_class(class);
        }
    }

    fn remove_class(&mut self, element: NodeId, class: &str) {
        if let Some(el) = self.element_mut(element) {
            el.remove_class(class);
        }
    }
}
