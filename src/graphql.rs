//! graphql types
//!
//! wrappers for graphql responses and errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// graphql response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data or null if errors
    pub data: Option<T>,
    /// protocol extensions sent by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, serde_json::Value>>,
    /// graphql errors array
    #[serde(default, skip_serializing_if = "GraphQlErrorList::is_empty")]
    pub errors: GraphQlErrorList,
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl<T> Default for GraphQlResponse<T> {
    fn default() -> Self {
        Self {
            data: None,
            extensions: None,
            errors: GraphQlErrorList::default(),
        }
    }
}

/// graphql error entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default)]
    pub locations: Vec<GraphQlLocation>,
    /// response path
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
    /// optional extensions payload
    #[serde(default)]
    pub extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    /// error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: Vec::new(),
            path: Vec::new(),
            extensions: None,
        }
    }
}

/// graphql error location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: i64,
    /// column number (1-based)
    pub column: i64,
}

/// server-reported error list, returned to callers as a single failure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphQlErrorList(Vec<GraphQlError>);

impl GraphQlErrorList {
    pub fn as_slice(&self) -> &[GraphQlError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<GraphQlError> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<GraphQlError>> for GraphQlErrorList {
    fn from(errors: Vec<GraphQlError>) -> Self {
        Self(errors)
    }
}

impl Deref for GraphQlErrorList {
    type Target = [GraphQlError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for GraphQlErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "graphql error"),
            [only] => write!(f, "{only}"),
            [first, rest @ ..] => write!(f, "{first} (and {} more)", rest.len()),
        }
    }
}
