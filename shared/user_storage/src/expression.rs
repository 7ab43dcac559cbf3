//! Attribute list to `DynamoDB` expression compiler
//!
//! Both the write path (`SET` clauses) and the query path (key conditions and
//! filters) walk an ordered attribute list and emit one
//! `(name placeholder, value placeholder, clause)` triple per entry. Every
//! attribute name and value is referenced through a placeholder so reserved
//! words (`name`, `level`, `date`, ...) and characters such as `-` or `.` in
//! attribute names never reach the expression text.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;

/// Result type alias for expression compilation
pub type ExpressionResult<T> = Result<T, ExpressionError>;

/// Errors raised while compiling an attribute list
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpressionError {
    /// An attribute name was empty
    #[error("attribute name must not be empty")]
    EmptyName,

    /// An attribute name collides with a name managed by the adapter
    #[error("attribute `{0}` is managed by the store adapter and cannot be set by callers")]
    ReservedName(String),
}

/// Ordered list of named attribute values.
///
/// Behaves like a map with stable insertion order: inserting a name that is
/// already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, AttributeValue)>);

impl Attributes {
    /// Creates an empty attribute list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts or replaces an attribute
    pub fn insert(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        if let Some(slot) = self.0.iter_mut().find(|(existing, _)| *existing == name) {
            slot.1 = value;
        } else {
            self.0.push((name, value));
        }
    }

    /// Builder-style [`Attributes::insert`]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Looks up an attribute value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0
            .iter()
            .find_map(|(existing, value)| (existing == name).then_some(value))
    }

    /// Whether an attribute with this name is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list holds no attributes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<N: Into<String>> FromIterator<(N, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, AttributeValue)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}

/// A compiled expression together with its placeholder tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    /// Clauses joined with the separator of the compile function used
    pub expression: String,
    /// `#placeholder -> attribute name`
    pub names: HashMap<String, String>,
    /// `:placeholder -> attribute value`
    pub values: HashMap<String, AttributeValue>,
}

impl CompiledExpression {
    /// Whether no clause was produced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// Merges the placeholder tables of `other` into `self`, leaving the
    /// expression text untouched.
    pub fn absorb_placeholders(&mut self, other: Self) {
        self.names.extend(other.names);
        self.values.extend(other.values);
    }
}

/// Compiles attributes into `#ns_i = :ns_i` assignment clauses joined by `, `.
///
/// The result is meant to follow a `SET ` keyword in an update expression.
///
/// # Errors
///
/// Returns [`ExpressionError::EmptyName`] if any attribute name is empty
pub fn compile_assignments(
    namespace: &str,
    attributes: &Attributes,
) -> ExpressionResult<CompiledExpression> {
    compile(namespace, attributes, ", ")
}

/// Compiles attributes into `#ns_i = :ns_i` equality conditions joined by ` AND `.
///
/// # Errors
///
/// Returns [`ExpressionError::EmptyName`] if any attribute name is empty
pub fn compile_conditions(
    namespace: &str,
    attributes: &Attributes,
) -> ExpressionResult<CompiledExpression> {
    compile(namespace, attributes, " AND ")
}

fn compile(
    namespace: &str,
    attributes: &Attributes,
    separator: &str,
) -> ExpressionResult<CompiledExpression> {
    let mut clauses = Vec::with_capacity(attributes.len());
    let mut names = HashMap::with_capacity(attributes.len());
    let mut values = HashMap::with_capacity(attributes.len());

    for (index, (name, value)) in attributes.iter().enumerate() {
        if name.is_empty() {
            return Err(ExpressionError::EmptyName);
        }

        let name_placeholder = format!("#{namespace}_{index}");
        let value_placeholder = format!(":{namespace}_{index}");

        clauses.push(format!("{name_placeholder} = {value_placeholder}"));
        names.insert(name_placeholder, name.to_string());
        values.insert(value_placeholder, value.clone());
    }

    Ok(CompiledExpression {
        expression: clauses.join(separator),
        names,
        values,
    })
}
