//! Best-effort JS/TS syntax parsing.
//!
//! Source is flattened into a `SyntaxIndex` of typed records: the closed
//! set of node shapes the rules actually consult (call sites, string
//! literals, JSX elements). Rules pattern-match on these records instead of
//! probing a raw tree.

pub mod javascript;

pub use javascript::parse_source;

/// Flattened syntax facts extracted from one source file.
#[derive(Debug, Clone, Default)]
pub struct SyntaxIndex {
    pub calls: Vec<CallSite>,
    pub string_literals: Vec<StringLiteral>,
    pub jsx_elements: Vec<JsxElement>,
}

/// One call expression (or `new` expression).
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Flattened callee: "CryptoJS.MD5", "fetch", "crypto.createHash".
    pub callee: String,
    /// Receiver chain before the final segment ("CryptoJS"), if any.
    pub receiver: Option<String>,
    /// Final callee segment ("MD5", "fetch").
    pub method: String,
    /// Raw text of the first argument, if present.
    pub first_arg: Option<String>,
    /// Raw text of the whole argument list, parens included.
    pub args_text: String,
    /// Name of the nearest enclosing function, if any.
    pub enclosing_function: Option<String>,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

/// One string literal (quoted string or substitution-free template).
#[derive(Debug, Clone)]
pub struct StringLiteral {
    pub value: String,
    /// Binding the literal initializes: variable name, object key, or
    /// assignment target. `None` for bare expression positions.
    pub binding: Option<String>,
    pub enclosing_function: Option<String>,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

/// One JSX element with its attributes.
#[derive(Debug, Clone)]
pub struct JsxElement {
    pub name: String,
    pub attributes: Vec<JsxAttribute>,
    pub line: usize,
    pub column: usize,
    pub byte_offset: usize,
}

#[derive(Debug, Clone)]
pub struct JsxAttribute {
    pub name: String,
    pub value: JsxAttrValue,
}

/// Attribute value shapes the rules distinguish between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsxAttrValue {
    /// Bare attribute, implicit boolean true.
    Bare,
    /// String literal value.
    Str(String),
    /// `{true}` / `{false}` expression.
    Bool(bool),
    /// Any other expression; dynamic from the rules' point of view.
    Expression(String),
}

impl JsxAttrValue {
    /// Whether the attribute evaluates to boolean true.
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Bare | Self::Bool(true))
    }

    /// Whether the value is a dynamic (non-literal) expression.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Expression(_))
    }
}

impl JsxElement {
    pub fn attribute(&self, name: &str) -> Option<&JsxAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}
