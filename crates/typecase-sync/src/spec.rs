//! The page contract: which elements the synchronizer binds to.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::field::Field;

/// Matches a lexically valid CSS identifier (id or class token).
static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").expect("Invalid identifier regex")
});

/// Element identifiers the synchronizer expects to find in a page.
///
/// Deserialized from the `[selectors]` section of `typecase.toml`; every
/// entry defaults to the id the scaffold page uses.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SelectorSpec {
    /// Id of the root element that carries the `data-*` attributes.
    #[serde(default = "default_root")]
    pub root: String,

    /// Class marking the elements that receive variant classes.
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Id of the version dropdown.
    #[serde(default = "default_version")]
    pub version: String,

    /// Id of the style dropdown.
    #[serde(default = "default_style")]
    pub style: String,

    /// Id of the weight dropdown.
    #[serde(default = "default_weight")]
    pub weight: String,
}

fn default_root() -> String {
    "body".to_string()
}

fn default_marker() -> String {
    "js-modifiable".to_string()
}

fn default_version() -> String {
    "selector-version".to_string()
}

fn default_style() -> String {
    "selector-style".to_string()
}

fn default_weight() -> String {
    "selector-weight".to_string()
}

impl Default for SelectorSpec {
    fn default() -> Self {
        Self {
            root: default_root(),
            marker: default_marker(),
            version: default_version(),
            style: default_style(),
            weight: default_weight(),
        }
    }
}

impl SelectorSpec {
    /// Id of the dropdown that drives `field`.
    pub fn select_id(&self, field: Field) -> &str {
        match field {
            Field::Version => &self.version,
            Field::Style => &self.style,
            Field::Weight => &self.weight,
        }
    }

    /// Check every configured identifier lexically, so a broken config
    /// fails before any document work starts.
    pub fn validate(&self) -> Result<(), SpecError> {
        for (entry, value) in [
            ("root", &self.root),
            ("marker", &self.marker),
            ("version", &self.version),
            ("style", &self.style),
            ("weight", &self.weight),
        ] {
            if !IDENTIFIER.is_match(value) {
                return Err(SpecError::InvalidIdentifier {
                    entry,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Errors in the configured page contract.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    #[error("selectors.{entry} is not a valid identifier: {value:?}")]
    InvalidIdentifier { entry: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_scaffold_page() {
        let spec = SelectorSpec::default();

        assert_eq!(spec.root, "body");
        assert_eq!(spec.marker, "js-modifiable");
        assert_eq!(spec.version, "selector-version");
        assert_eq!(spec.style, "selector-style");
        assert_eq!(spec.weight, "selector-weight");
    }

    #[test]
    fn deserializes_partial_toml_with_defaults() {
        let spec: SelectorSpec = toml::from_str("root = \"specimen\"").unwrap();

        assert_eq!(spec.root, "specimen");
        assert_eq!(spec.marker, "js-modifiable");
        assert_eq!(spec.weight, "selector-weight");
    }

    #[test]
    fn select_id_maps_each_field() {
        let spec = SelectorSpec::default();

        assert_eq!(spec.select_id(Field::Version), "selector-version");
        assert_eq!(spec.select_id(Field::Style), "selector-style");
        assert_eq!(spec.select_id(Field::Weight), "selector-weight");
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(SelectorSpec::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_identifiers() {
        for bad in ["", "has space", "1leading-digit", "quo\"te"] {
            let spec = SelectorSpec {
                marker: bad.to_string(),
                ..SelectorSpec::default()
            };
            let err = spec.validate().unwrap_err();
            assert!(err.to_string().contains("selectors.marker"), "{err}");
        }
    }
}
