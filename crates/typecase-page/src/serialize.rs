//! HTML output.

use crate::dom::{Document, NodeId, NodeKind, VOID_ELEMENTS};

/// Output options.
#[derive(Debug, Clone, Default)]
pub struct SerializeOptions {
    /// Drop comment nodes from the output.
    pub strip_comments: bool,
}

/// Render the document back to HTML.
///
/// Text and attribute values are emitted verbatim, matching the parser
/// which never decodes entities, so parse and serialize round-trip apart
/// from tag-case normalization.
pub fn to_html(document: &Document, options: &SerializeOptions) -> String {
    let mut out = String::new();
    for &root in document.roots() {
        write_node(document, root, options, &mut out);
    }
    out
}

fn write_node(document: &Document, id: NodeId, options: &SerializeOptions, out: &mut String) {
    match document.kind(id) {
        NodeKind::Doctype(name) => {
            out.push_str("<!DOCTYPE");
            if !name.is_empty() {
                out.push(' ');
                out.push_str(name);
            }
            out.push('>');
        }
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::Comment(body) => {
            if !options.strip_comments {
                out.push_str("<!--");
                out.push_str(body);
                out.push_str("-->");
            }
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for attr in &el.attrs {
                out.push(' ');
                out.push_str(&attr.name);
                if let Some(value) = &attr.value {
                    out.push_str("=\"");
                    if value.contains('"') {
                        out.push_str(&value.replace('"', "&quot;"));
                    } else {
                        out.push_str(value);
                    }
                    out.push('"');
                }
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name.as_str()) {
                return;
            }
            for &child in document.children(id) {
                write_node(document, child, options, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;
    use pretty_assertions::assert_eq;

    fn roundtrip(source: &str) -> String {
        let page = parse_html(source).unwrap();
        to_html(&page.document, &SerializeOptions::default())
    }

    #[test]
    fn roundtrips_a_page() {
        let source = "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>Specimen</title></head>\n<body id=\"body\" data-weight=\"regular\">\n<p class=\"js-modifiable regular\">Aa Bb</p>\n</body>\n</html>\n";

        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn keeps_entities_untouched() {
        assert_eq!(roundtrip("<p>A &amp; B</p>"), "<p>A &amp; B</p>");
    }

    #[test]
    fn bare_attributes_stay_bare() {
        assert_eq!(
            roundtrip("<option value=\"Bold\" selected>Bold</option>"),
            "<option value=\"Bold\" selected>Bold</option>"
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        assert_eq!(
            roundtrip("<head><link rel=\"stylesheet\" href=\"styles.css\"></head>"),
            "<head><link rel=\"stylesheet\" href=\"styles.css\"></head>"
        );
    }

    #[test]
    fn strip_comments_drops_comment_nodes_only() {
        let page = parse_html("<div><!-- note --><p>kept</p></div>").unwrap();

        let html = to_html(
            &page.document,
            &SerializeOptions {
                strip_comments: true,
            },
        );

        assert_eq!(html, "<div><p>kept</p></div>");
    }

    #[test]
    fn escapes_quotes_in_attribute_values() {
        let page = parse_html("<div title='say \"hi\"'></div>").unwrap();

        let html = to_html(&page.document, &SerializeOptions::default());

        assert_eq!(html, "<div title=\"say &quot;hi&quot;\"></div>");
    }
}
