//! HTML page parser.
//!
//! A cursor-driven parser producing the arena [`Document`]. It covers the
//! subset of HTML a specimen page uses: doctype, comments, elements with
//! quoted, unquoted and bare attributes, void elements, and raw text inside
//! `script` and `style`. Recoverable sloppiness (stray or missing closing
//! tags) is collected as warnings so the audit can surface it; only
//! unterminated constructs are hard errors.

use crate::dom::{Attr, Document, ElementData, NodeId, NodeKind, VOID_ELEMENTS};

/// Elements whose content is raw text up to the matching closing tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// A parsed page plus anything the parser had to paper over.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    pub document: Document,
    pub warnings: Vec<ParseWarning>,
}

/// A recoverable defect in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based source line.
    pub line: usize,
    pub message: String,
}

/// Errors that end parsing outright.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Parse an HTML page into a [`Document`].
pub fn parse_html(source: &str) -> Result<ParsedPage, ParseError> {
    Parser::new(source).run()
}

struct OpenElement {
    id: NodeId,
    name: String,
    line: usize,
}

struct Parser {
    input: Vec<char>,
    pos: usize,
    line: usize,
    document: Document,
    stack: Vec<OpenElement>,
    warnings: Vec<ParseWarning>,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            input: source.chars().collect(),
            pos: 0,
            line: 1,
            document: Document::default(),
            stack: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.input.get(self.pos).copied();
        if let Some(c) = c {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
            }
        }
        c
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    /// Case-insensitive lookahead; `needle` must already be lowercase.
    fn lookahead(&self, needle: &str) -> bool {
        needle.chars().enumerate().all(|(i, expected)| {
            self.peek_at(i).map(|c| c.to_ascii_lowercase()) == Some(expected)
        })
    }

    fn warn(&mut self, line: usize, message: String) {
        self.warnings.push(ParseWarning { line, message });
    }

    fn parent(&self) -> Option<NodeId> {
        self.stack.last().map(|open| open.id)
    }

    fn run(mut self) -> Result<ParsedPage, ParseError> {
        while self.pos < self.input.len() {
            if self.lookahead("<!--") {
                self.comment()?;
            } else if self.lookahead("<!doctype") {
                self.doctype()?;
            } else if self.lookahead("<!") {
                self.bogus_declaration()?;
            } else if self.lookahead("</") {
                self.closing_tag()?;
            } else if self.peek() == Some('<')
                && self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic())
            {
                self.opening_tag()?;
            } else {
                self.text();
            }
        }
        while let Some(open) = self.stack.pop() {
            self.warn(open.line, format!("<{}> is never closed", open.name));
        }
        Ok(ParsedPage {
            document: self.document,
            warnings: self.warnings,
        })
    }

    fn text(&mut self) {
        let line = self.line;
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '<' {
                let next = self.peek_at(1);
                let opens_markup = next == Some('/')
                    || next == Some('!')
                    || next.is_some_and(|c| c.is_ascii_alphabetic());
                if opens_markup {
                    break;
                }
            }
            text.push(c);
            self.bump();
        }
        if !text.is_empty() {
            let parent = self.parent();
            self.document.push(NodeKind::Text(text), parent, line);
        }
    }

    fn comment(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.advance(4);
        let mut body = String::new();
        loop {
            if self.lookahead("-->") {
                self.advance(3);
                break;
            }
            match self.bump() {
                Some(c) => body.push(c),
                None => {
                    return Err(ParseError::Parse {
                        line,
                        message: "unterminated comment".to_string(),
                    });
                }
            }
        }
        let parent = self.parent();
        self.document.push(NodeKind::Comment(body), parent, line);
        Ok(())
    }

    fn doctype(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.advance(2);
        let mut body = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) => body.push(c),
                None => {
                    return Err(ParseError::Parse {
                        line,
                        message: "unterminated doctype".to_string(),
                    });
                }
            }
        }
        // body starts with the (case-insensitive) DOCTYPE keyword.
        let name = body["doctype".len()..].trim().to_string();
        let parent = self.parent();
        self.document.push(NodeKind::Doctype(name), parent, line);
        Ok(())
    }

    /// `<!` that is neither a comment nor a doctype; consumed through `>`
    /// and kept as a comment node, as browsers do.
    fn bogus_declaration(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.advance(2);
        let mut body = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) => body.push(c),
                None => {
                    return Err(ParseError::Parse {
                        line,
                        message: "unterminated markup declaration".to_string(),
                    });
                }
            }
        }
        self.warn(line, "bogus markup declaration kept as a comment".to_string());
        let parent = self.parent();
        self.document.push(NodeKind::Comment(body), parent, line);
        Ok(())
    }

    fn opening_tag(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.bump();
        let name = self.tag_name();
        let mut attrs = Vec::new();
        let self_closing = self.attributes(&mut attrs, &name)?;

        let parent = self.parent();
        let id = self
            .document
            .push(NodeKind::Element(ElementData { name: name.clone(), attrs }), parent, line);

        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            return Ok(());
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            return self.raw_text(id, &name, line);
        }
        self.stack.push(OpenElement { id, name, line });
        Ok(())
    }

    fn tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' {
                name.push(c.to_ascii_lowercase());
                self.bump();
            } else {
                break;
            }
        }
        name
    }

    /// Parse attributes up to the closing `>`; returns true for `/>`.
    fn attributes(&mut self, attrs: &mut Vec<Attr>, tag: &str) -> Result<bool, ParseError> {
        loop {
            while self.peek().is_some_and(|c| c.is_whitespace()) {
                self.bump();
            }
            match self.peek() {
                None => {
                    return Err(ParseError::Parse {
                        line: self.line,
                        message: format!("unexpected end of input inside <{tag}>"),
                    });
                }
                Some('>') => {
                    self.bump();
                    return Ok(false);
                }
                Some('/') => {
                    self.bump();
                    if self.peek() == Some('>') {
                        self.bump();
                        return Ok(true);
                    }
                    self.warn(self.line, format!("stray '/' inside <{tag}>"));
                }
                Some(_) => attrs.push(self.attribute(tag)?),
            }
        }
    }

    fn attribute(&mut self, tag: &str) -> Result<Attr, ParseError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' || c == '>' || c == '/' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.bump();
        }
        if name.is_empty() {
            return Err(ParseError::Parse {
                line: self.line,
                message: format!("malformed attribute in <{tag}>"),
            });
        }

        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }
        if self.peek() != Some('=') {
            return Ok(Attr { name, value: None });
        }
        self.bump();
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.bump();
        }

        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let line = self.line;
                self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => {
                            return Err(ParseError::Parse {
                                line,
                                message: format!("unterminated value for {name} in <{tag}>"),
                            });
                        }
                    }
                }
                value
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.bump();
                }
                value
            }
        };
        Ok(Attr { name, value: Some(value) })
    }

    /// Consume raw text until the matching closing tag, e.g. everything up
    /// to `</script>`. Markup inside is kept as text.
    fn raw_text(&mut self, id: NodeId, name: &str, open_line: usize) -> Result<(), ParseError> {
        let close = format!("</{name}");
        let close_len = close.chars().count();
        let line = self.line;
        let mut text = String::new();
        loop {
            if self.pos >= self.input.len() {
                return Err(ParseError::Parse {
                    line: open_line,
                    message: format!("<{name}> is never closed"),
                });
            }
            if self.lookahead(&close) {
                match self.peek_at(close_len) {
                    None => break,
                    Some(c) if c.is_whitespace() || c == '>' || c == '/' => break,
                    Some(_) => {}
                }
            }
            if let Some(c) = self.bump() {
                text.push(c);
            }
        }
        if !text.is_empty() {
            self.document.push(NodeKind::Text(text), Some(id), line);
        }
        self.advance(close_len);
        loop {
            match self.bump() {
                Some('>') => break,
                Some(_) => {}
                None => {
                    return Err(ParseError::Parse {
                        line: open_line,
                        message: format!("unterminated closing tag for <{name}>"),
                    });
                }
            }
        }
        Ok(())
    }

    fn closing_tag(&mut self) -> Result<(), ParseError> {
        let line = self.line;
        self.advance(2);
        let name = self.tag_name();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(_) => {}
                None => {
                    return Err(ParseError::Parse {
                        line,
                        message: format!("unterminated closing tag </{name}"),
                    });
                }
            }
        }
        if name.is_empty() {
            self.warn(line, "closing tag with no name".to_string());
            return Ok(());
        }

        // Close everything above the matching element, then the element.
        match self.stack.iter().rposition(|open| open.name == name) {
            Some(depth) => {
                while self.stack.len() > depth + 1 {
                    if let Some(open) = self.stack.pop() {
                        self.warn(
                            open.line,
                            format!("<{}> implicitly closed by </{name}>", open.name),
                        );
                    }
                }
                self.stack.pop();
            }
            None => self.warn(line, format!("stray closing tag </{name}>")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeKind;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> ParsedPage {
        parse_html(source).unwrap()
    }

    fn element_names(page: &ParsedPage) -> Vec<String> {
        page.document
            .descendants()
            .filter_map(|id| page.document.element(id).map(|el| el.name.clone()))
            .collect()
    }

    #[test]
    fn parses_a_minimal_page() {
        let page = parse(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><title>Specimen</title></head>\n<body id=\"body\"><p>Hi</p></body>\n</html>\n",
        );

        assert!(page.warnings.is_empty());
        assert_eq!(
            element_names(&page),
            vec!["html", "head", "title", "body", "p"]
        );
        let doctype = page.document.roots()[0];
        assert_eq!(page.document.kind(doctype), &NodeKind::Doctype("html".to_string()));
    }

    #[test]
    fn parses_attribute_flavors() {
        let page = parse("<option value=\"Semi Bold\" data-x='y' selected tabindex=3>Semi Bold</option>");

        let option = page.document.roots()[0];
        let el = page.document.element(option).unwrap();
        assert_eq!(el.attribute("value"), Some("Semi Bold"));
        assert_eq!(el.attribute("data-x"), Some("y"));
        assert!(el.has_attribute("selected"));
        assert_eq!(el.attribute("selected"), None);
        assert_eq!(el.attribute("tabindex"), Some("3"));
    }

    #[test]
    fn void_elements_do_not_nest() {
        let page = parse("<head><meta charset=\"utf-8\"><link rel=\"stylesheet\" href=\"x.css\"><title>T</title></head>");

        let head = page.document.roots()[0];
        let children: Vec<&str> = page
            .document
            .children(head)
            .iter()
            .filter_map(|&id| page.document.element(id).map(|el| el.name.as_str()))
            .collect();
        assert_eq!(children, vec!["meta", "link", "title"]);
    }

    #[test]
    fn script_content_is_raw_text() {
        let page = parse("<script>if (a < b) { document.write('<div>'); }</script><p>after</p>");

        let script = page.document.roots()[0];
        let el = page.document.element(script).unwrap();
        assert_eq!(el.name, "script");
        assert_eq!(
            page.document.text_of(script),
            "if (a < b) { document.write('<div>'); }"
        );
        assert_eq!(element_names(&page), vec!["script", "p"]);
    }

    #[test]
    fn comments_keep_their_body() {
        let page = parse("<div><!-- build: keep\nacross lines --></div>");

        let div = page.document.roots()[0];
        let comment = page.document.children(div)[0];
        assert_eq!(
            page.document.kind(comment),
            &NodeKind::Comment(" build: keep\nacross lines ".to_string())
        );
    }

    #[test]
    fn closing_tags_match_case_insensitively() {
        let page = parse("<DIV><P>text</P></DIV>");

        assert!(page.warnings.is_empty());
        assert_eq!(element_names(&page), vec!["div", "p"]);
    }

    #[test]
    fn stray_closing_tag_is_a_warning() {
        let page = parse("<div></span></div>");

        assert_eq!(page.warnings.len(), 1);
        assert!(page.warnings[0].message.contains("stray closing tag </span>"));
    }

    #[test]
    fn unclosed_element_is_a_warning_with_its_line() {
        let page = parse("<div>\n<section>\n</div>\n");

        assert!(page
            .warnings
            .iter()
            .any(|w| w.line == 2 && w.message.contains("<section> implicitly closed")));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        let err = parse_html("<p></p>\n<!-- never ends").unwrap_err();

        let ParseError::Parse { line, message } = err;
        assert_eq!(line, 2);
        assert!(message.contains("unterminated comment"));
    }

    #[test]
    fn unterminated_attribute_value_is_an_error() {
        let err = parse_html("<div class=\"open></div>").unwrap_err();

        let ParseError::Parse { message, .. } = err;
        assert!(message.contains("unterminated value for class"));
    }

    #[test]
    fn text_keeps_entities_verbatim() {
        let page = parse("<p>A &amp; B</p>");

        let p = page.document.roots()[0];
        assert_eq!(page.document.text_of(p), "A &amp; B");
    }
}
