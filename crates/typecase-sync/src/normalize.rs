//! Option-text normalization.

/// Lowercase `text` and replace every space with a hyphen.
///
/// The result is used both as a CSS class token and as a `data-*` attribute
/// value, so `"Semi Bold"` and `"semi-bold"` compare equal once normalized.
/// Only ASCII spaces are replaced; other whitespace passes through.
pub fn normalize(text: &str) -> String {
    text.replace(' ', "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(normalize("Semi Bold"), "semi-bold");
        assert_eq!(normalize("ITALIC"), "italic");
        assert_eq!(normalize("Extra Bold Display"), "extra-bold-display");
    }

    #[test]
    fn is_idempotent() {
        for raw in ["Semi Bold", "regular", "Display Black", ""] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn leaves_other_whitespace_alone() {
        assert_eq!(normalize("a\tb"), "a\tb");
        assert_eq!(normalize("a\nb"), "a\nb");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize(""), "");
    }
}
