//! Minimal XML tree reader for packed-netlist documents.
//!
//! Parses the subset the packed-netlist schema uses: nested elements with
//! attributes and text content, an optional prolog, comments, and the five
//! predefined entities. Every node records its 1-based source line for
//! error reporting. Namespaces, CDATA, processing beyond the prolog, and
//! doctypes are out of scope.

use crate::error::PackError;

/// One element of the parsed document tree.
#[derive(Debug, Clone)]
pub struct XmlNode {
    /// Element name.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child elements in source order.
    pub children: Vec<XmlNode>,
    /// Concatenated text content (child-element text excluded).
    pub text: String,
    /// 1-based line of the opening tag.
    pub line: u32,
}

impl XmlNode {
    /// Looks up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Looks up a required attribute value.
    pub fn expect_attribute(&self, name: &str, file: &str) -> Result<&str, PackError> {
        self.attribute(name).ok_or_else(|| {
            PackError::schema(
                file,
                self.line,
                format!("Element '{}' requires a '{name}' attribute", self.name),
            )
        })
    }

    /// Iterates over child elements with the given name.
    pub fn children_named<'a, 'b>(&'a self, name: &'b str) -> impl Iterator<Item = &'a XmlNode> + use<'a, 'b> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the first child element with the given name, if any.
    pub fn first_child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the unique child element with the given name.
    pub fn single_child(&self, name: &str, file: &str) -> Result<&XmlNode, PackError> {
        let mut matches = self.children_named(name);
        let first = matches.next().ok_or_else(|| {
            PackError::schema(
                file,
                self.line,
                format!("Element '{}' requires a '{name}' child", self.name),
            )
        })?;
        if let Some(second) = matches.next() {
            return Err(PackError::schema(
                file,
                second.line,
                format!("Element '{}' has more than one '{name}' child", self.name),
            ));
        }
        Ok(first)
    }

    /// Iterates over the whitespace-separated tokens of the text content.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace()
    }
}

/// Parses a document into its root element.
pub fn parse_document(source: &str, file: &str) -> Result<XmlNode, PackError> {
    let mut parser = Parser {
        source: source.as_bytes(),
        pos: 0,
        line: 1,
        file,
    };
    parser.skip_misc()?;
    if parser.at_end() {
        return Err(parser.error("document has no root element"));
    }
    let root = parser.parse_element()?;
    parser.skip_misc()?;
    if !parser.at_end() {
        return Err(parser.error("content after the root element"));
    }
    Ok(root)
}

struct Parser<'a> {
    source: &'a [u8],
    pos: usize,
    line: u32,
    file: &'a str,
}

impl Parser<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn peek(&self) -> u8 {
        if self.pos < self.source.len() {
            self.source[self.pos]
        } else {
            0
        }
    }

    fn advance(&mut self) -> u8 {
        let b = self.source[self.pos];
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        b
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s.as_bytes())
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> PackError {
        PackError::schema(self.file, self.line, message)
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.peek().is_ascii_whitespace() {
            self.advance();
        }
    }

    // Skips whitespace, comments, and the prolog between elements.
    fn skip_misc(&mut self) -> Result<(), PackError> {
        loop {
            self.skip_whitespace();
            if self.starts_with("<!--") {
                self.skip_comment()?;
            } else if self.starts_with("<?") {
                self.skip(2);
                loop {
                    if self.at_end() {
                        return Err(self.error("unterminated prolog"));
                    }
                    if self.starts_with("?>") {
                        self.skip(2);
                        break;
                    }
                    self.advance();
                }
            } else {
                return Ok(());
            }
        }
    }

    fn skip_comment(&mut self) -> Result<(), PackError> {
        let start_line = self.line;
        self.skip(4);
        loop {
            if self.at_end() {
                return Err(PackError::schema(
                    self.file,
                    start_line,
                    "unterminated comment",
                ));
            }
            if self.starts_with("-->") {
                self.skip(3);
                return Ok(());
            }
            self.advance();
        }
    }

    fn read_name(&mut self) -> Result<String, PackError> {
        let start = self.pos;
        while !self.at_end() && is_name_byte(self.peek()) {
            self.advance();
        }
        if self.pos == start {
            return Err(self.error("expected a name"));
        }
        Ok(String::from_utf8_lossy(&self.source[start..self.pos]).into_owned())
    }

    fn parse_element(&mut self) -> Result<XmlNode, PackError> {
        let line = self.line;
        if self.peek() != b'<' {
            return Err(self.error("expected '<'"));
        }
        self.advance();
        let name = self.read_name()?;

        let mut node = XmlNode {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
            text: String::new(),
            line,
        };

        // Attributes.
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error("unterminated start tag"));
            }
            if self.starts_with("/>") {
                self.skip(2);
                return Ok(node);
            }
            if self.peek() == b'>' {
                self.advance();
                break;
            }
            let attr_name = self.read_name()?;
            self.skip_whitespace();
            if self.peek() != b'=' {
                return Err(self.error(format!("attribute '{attr_name}' requires a value")));
            }
            self.advance();
            self.skip_whitespace();
            let quote = self.peek();
            if quote != b'"' && quote != b'\'' {
                return Err(self.error("attribute value must be quoted"));
            }
            self.advance();
            let value = self.read_until_quote(quote)?;
            node.attrs.push((attr_name, value));
        }

        // Content: text runs, children, comments, then the closing tag.
        loop {
            if self.at_end() {
                return Err(PackError::schema(
                    self.file,
                    line,
                    format!("element '{}' is never closed", node.name),
                ));
            }
            if self.starts_with("</") {
                self.skip(2);
                let close = self.read_name()?;
                if close != node.name {
                    return Err(self.error(format!(
                        "mismatched closing tag '{close}' (expected '{}')",
                        node.name
                    )));
                }
                self.skip_whitespace();
                if self.peek() != b'>' {
                    return Err(self.error("expected '>' after closing tag name"));
                }
                self.advance();
                return Ok(node);
            }
            if self.starts_with("<!--") {
                self.skip_comment()?;
                continue;
            }
            if self.peek() == b'<' {
                let child = self.parse_element()?;
                node.children.push(child);
                continue;
            }
            // Text run up to the next markup.
            while !self.at_end() && self.peek() != b'<' {
                if self.peek() == b'&' {
                    node.text.push(self.read_entity()?);
                } else {
                    node.text.push(self.advance() as char);
                }
            }
        }
    }

    fn read_until_quote(&mut self, quote: u8) -> Result<String, PackError> {
        let mut value = String::new();
        loop {
            if self.at_end() {
                return Err(self.error("unterminated attribute value"));
            }
            if self.peek() == quote {
                self.advance();
                return Ok(value);
            }
            if self.peek() == b'&' {
                value.push(self.read_entity()?);
            } else {
                value.push(self.advance() as char);
            }
        }
    }

    fn read_entity(&mut self) -> Result<char, PackError> {
        for (entity, ch) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
        ] {
            if self.starts_with(entity) {
                self.skip(entity.len());
                return Ok(ch);
            }
        }
        Err(self.error("unknown entity reference"))
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':')
}
