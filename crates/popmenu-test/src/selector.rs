//! CSS-like selector parsing for document queries.
//!
//! Supports:
//! - `"button"` - by tag name
//! - `"#main"` - by `id` attribute
//! - `".item"` - by class
//! - `"[data-has-sub]"`, `"[aria-expanded='true']"` - by attribute
//! - `".item[aria-disabled='false']"` - compound selectors
//! - `".item:not([aria-disabled='true'])"` - negation
//! - `".menu .item"`, `".submenu > .item"` - descendant and child combinators

use crate::document::Document;
use popmenu_core::{NodeId, Surface};

/// Parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Match by tag name
    Type(String),
    /// Match by ID (e.g., `#my-id`)
    Id(String),
    /// Match by class (e.g., `.my-class`)
    Class(String),
    /// Match by attribute presence or value (e.g., `[role='menu']`)
    Attribute { name: String, value: Option<String> },
    /// Every part must match (e.g., `.item[data-has-sub]`)
    Compound(Vec<Selector>),
    /// Negation (e.g., `:not(.sep)`)
    Not(Box<Selector>),
    /// Descendant combinator (e.g., `.menu .item`)
    Descendant(Box<Selector>, Box<Selector>),
    /// Child combinator (e.g., `.submenu > .item`)
    Child(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector is invalid.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        SelectorParser::new(input).parse()
    }

    /// Check if this selector matches a node of the document.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        match self {
            Self::Type(name) => doc.tag(node).is_some_and(|tag| tag.eq_ignore_ascii_case(name)),
            Self::Id(id) => doc.attribute(node, "id").as_deref() == Some(id.as_str()),
            Self::Class(class) => doc
                .attribute(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Self::Attribute { name, value } => match (doc.attribute(node, name), value) {
                (Some(actual), Some(expected)) => &actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            },
            Self::Compound(parts) => parts.iter().all(|part| part.matches(doc, node)),
            Self::Not(inner) => !inner.matches(doc, node),
            Self::Descendant(ancestor, sel) => {
                sel.matches(doc, node) && doc.ancestors(node).any(|a| ancestor.matches(doc, a))
            }
            Self::Child(parent, sel) => {
                sel.matches(doc, node) && doc.parent(node).is_some_and(|p| parent.matches(doc, p))
            }
        }
    }
}

/// Selector parser.
pub struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    /// Create a new parser.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the selector.
    pub fn parse(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();

        if self.peek_char().is_none() {
            return Err(SelectorError::Empty);
        }

        let selector = self.parse_complex()?;
        match self.peek_char() {
            None => Ok(selector),
            Some(c) => Err(SelectorError::UnexpectedChar(c)),
        }
    }

    fn parse_complex(&mut self) -> Result<Selector, SelectorError> {
        let mut selector = self.parse_compound()?;
        loop {
            let spaced = self.skip_whitespace();
            match self.peek_char() {
                None | Some(')') => return Ok(selector),
                Some('>') => {
                    self.advance();
                    self.skip_whitespace();
                    let child = self.parse_compound()?;
                    selector = Selector::Child(Box::new(selector), Box::new(child));
                }
                Some(_) if spaced => {
                    let descendant = self.parse_compound()?;
                    selector = Selector::Descendant(Box::new(selector), Box::new(descendant));
                }
                Some(c) => return Err(SelectorError::UnexpectedChar(c)),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Selector, SelectorError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek_char() {
            let part = match c {
                '#' => self.parse_id()?,
                '.' => self.parse_class()?,
                '[' => self.parse_attribute()?,
                ':' => self.parse_pseudo()?,
                _ if parts.is_empty() && c.is_alphabetic() => self.parse_type()?,
                _ => break,
            };
            parts.push(part);
        }

        match parts.len() {
            0 => Err(self
                .peek_char()
                .map_or(SelectorError::ExpectedIdentifier, SelectorError::UnexpectedChar)),
            1 => Ok(parts.remove(0)),
            _ => Ok(Selector::Compound(parts)),
        }
    }

    fn parse_id(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '#'
        let id = self.read_identifier()?;
        Ok(Selector::Id(id))
    }

    fn parse_class(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '.'
        let class = self.read_identifier()?;
        Ok(Selector::Class(class))
    }

    fn parse_type(&mut self) -> Result<Selector, SelectorError> {
        let name = self.read_identifier()?;
        Ok(Selector::Type(name))
    }

    fn parse_pseudo(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip ':'
        let name = self.read_identifier()?;
        if name != "not" {
            return Err(SelectorError::UnknownPseudoClass(name));
        }
        if self.peek_char() != Some('(') {
            return Err(SelectorError::UnclosedParen);
        }
        self.advance();
        self.skip_whitespace();
        let inner = self.parse_complex()?;
        if self.peek_char() != Some(')') {
            return Err(SelectorError::UnclosedParen);
        }
        self.advance();
        Ok(Selector::Not(Box::new(inner)))
    }

    fn parse_attribute(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '['

        let name = self.read_until_any(&['=', ']']).trim().to_string();
        if name.is_empty() {
            return Err(SelectorError::InvalidAttribute);
        }

        let value = if self.peek_char() == Some('=') {
            self.advance();
            match self.peek_char() {
                Some(quote @ ('\'' | '"')) => {
                    self.advance();
                    let value = self.read_until_any(&[quote]);
                    if self.peek_char() != Some(quote) {
                        return Err(SelectorError::UnclosedAttribute);
                    }
                    self.advance();
                    Some(value)
                }
                _ => Some(self.read_until_any(&[']']).trim().to_string()),
            }
        } else {
            None
        };

        if self.peek_char() != Some(']') {
            return Err(SelectorError::UnclosedAttribute);
        }
        self.advance();

        Ok(Selector::Attribute { name, value })
    }

    fn read_identifier(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(SelectorError::ExpectedIdentifier);
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn read_until_any(&mut self, stops: &[char]) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if stops.contains(&c) {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        self.pos > start
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}

/// Selector parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Empty selector
    Empty,
    /// Unexpected character
    UnexpectedChar(char),
    /// Expected identifier
    ExpectedIdentifier,
    /// Invalid attribute syntax
    InvalidAttribute,
    /// Unclosed attribute bracket
    UnclosedAttribute,
    /// Pseudo-class other than `:not`
    UnknownPseudoClass(String),
    /// Missing `(` or `)` around a `:not` argument
    UnclosedParen,
}

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::UnexpectedChar(c) => write!(f, "unexpected character: '{c}'"),
            Self::ExpectedIdentifier => write!(f, "expected identifier"),
            Self::InvalidAttribute => write!(f, "invalid attribute syntax"),
            Self::UnclosedAttribute => write!(f, "unclosed attribute bracket"),
            Self::UnknownPseudoClass(name) => write!(f, "unknown pseudo-class: ':{name}'"),
            Self::UnclosedParen => write!(f, "unclosed parenthesis"),
        }
    }
}

impl std::error::Error for SelectorError {}
