//! error types
//!
//! structured errors for config, http, json, generation, decoding, and
//! graphql responses.

use crate::graphql::{GraphQlError, GraphQlErrorList};
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// error type for the transport and the binding generator
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("transport error: {message}")]
    Transport {
        /// http status if the server answered
        status: Option<u16>,
        /// raw response body, or a placeholder if it could not be read
        body: String,
        /// top-level message
        message: String,
    },

    #[error("graphql error: {message}")]
    GraphQl {
        /// http status of the response carrying the errors
        status: Option<u16>,
        /// graphql error list
        errors: GraphQlErrorList,
        /// raw response body
        body: String,
        /// top-level message
        message: String,
        /// partial data that accompanied the errors
        data: Option<serde_json::Value>,
    },

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("request cancelled")]
    Cancelled,
}

impl Error {
    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Error::GraphQl {
                status: Some(401 | 403),
                ..
            } | Error::Transport {
                status: Some(401 | 403),
                ..
            }
        ) || matches!(self, Error::Http(err) if err.status() == Some(reqwest::StatusCode::UNAUTHORIZED))
    }

    /// true if the request was aborted by the caller's cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// server-reported errors, if this is a graphql error
    pub fn graphql_errors(&self) -> Option<&[GraphQlError]> {
        match self {
            Error::GraphQl { errors, .. } => Some(errors.as_slice()),
            _ => None,
        }
    }

    /// data the server sent alongside its errors, decoded as `T`
    pub fn partial_data<T: serde::de::DeserializeOwned>(&self) -> Option<T> {
        match self {
            Error::GraphQl {
                data: Some(data), ..
            } if !data.is_null() => serde_json::from_value(data.clone()).ok(),
            _ => None,
        }
    }

    /// network, http status, or upload buffering failure
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Http(_))
    }
}

/// schema/operation mismatch found while generating bindings
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("failed to parse schema: {0}")]
    SchemaParse(String),

    #[error("failed to parse operation document: {0}")]
    DocumentParse(String),

    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("field `{field}` does not exist on type `{parent}`")]
    UnknownField { parent: String, field: String },

    #[error("argument `{argument}` does not exist on field `{parent}.{field}`")]
    UnknownArgument {
        parent: String,
        field: String,
        argument: String,
    },

    #[error("unknown fragment `{0}`")]
    UnknownFragment(String),

    #[error("fragment on `{condition}` can never apply to `{parent}`")]
    ImpossibleFragment { parent: String, condition: String },

    #[error("field `{field}` of leaf type `{type_name}` cannot have a selection set")]
    LeafWithSelection { field: String, type_name: String },

    #[error("field `{field}` of composite type `{type_name}` needs a selection set")]
    MissingSelection { field: String, type_name: String },

    #[error("variable `${0}` is not declared")]
    UndefinedVariable(String),

    #[error("variable `${variable}` of type `{declared}` cannot be used where `{expected}` is expected")]
    VariableTypeMismatch {
        variable: String,
        declared: String,
        expected: String,
    },

    #[error("variable `${variable}` has non-input type `{type_name}`")]
    NonInputVariable { variable: String, type_name: String },

    #[error("default value for `{name}` does not match type `{expected}`")]
    DefaultValueMismatch { name: String, expected: String },

    #[error("conflicting selections for response key `{key}`: {reason}")]
    FieldConflict { key: String, reason: String },

    #[error("operation has no name")]
    AnonymousOperation,

    #[error("operation `{0}` is a subscription, which is not supported")]
    Subscription(String),

    #[error("fragment `{0}` spreads itself")]
    FragmentCycle(String),

    #[error("field `{field}` has abstract type `{type_name}` with no possible types")]
    NoPossibleTypes { field: String, type_name: String },

    #[error("generated type `{0}` is already defined by another operation")]
    NameCollision(String),
}

/// wire value that does not match the synthesized response shape
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing `__typename` for `{type_name}` at `{path}`")]
    MissingDiscriminator { type_name: String, path: String },

    #[error("unknown variant `{typename}` for `{type_name}` at `{path}`")]
    UnknownVariant {
        type_name: String,
        typename: String,
        path: String,
    },

    #[error("missing field at `{path}`")]
    MissingField { path: String },

    #[error("unexpected null at `{path}`")]
    UnexpectedNull { path: String },

    #[error("expected {expected} at `{path}`")]
    TypeMismatch { expected: String, path: String },
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphql_error(status: u16) -> Error {
        Error::GraphQl {
            status: Some(status),
            errors: GraphQlErrorList::default(),
            body: String::new(),
            message: "boom".to_string(),
            data: None,
        }
    }

    #[test]
    fn test_is_auth_error() {
        assert!(graphql_error(401).is_auth_error());
        assert!(graphql_error(403).is_auth_error());
        assert!(!graphql_error(500).is_auth_error());

        let err = Error::Transport {
            status: Some(403),
            body: "nope".to_string(),
            message: "forbidden".to_string(),
        };
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_graphql_errors_accessor() {
        let err = Error::GraphQl {
            status: Some(200),
            errors: GraphQlErrorList::from(vec![GraphQlError::new("bad")]),
            body: String::new(),
            message: "bad".to_string(),
            data: Some(serde_json::json!({"value": 3})),
        };
        assert_eq!(err.graphql_errors().unwrap()[0].message, "bad");

        #[derive(serde::Deserialize)]
        struct Data {
            value: i64,
        }
        assert_eq!(err.partial_data::<Data>().unwrap().value, 3);
        assert!(Error::Cancelled.graphql_errors().is_none());
        assert!(Error::Cancelled.is_cancelled());
    }

    #[test]
    fn test_decode_error_messages() {
        let err = DecodeError::UnknownVariant {
            type_name: "Node".to_string(),
            typename: "Robot".to_string(),
            path: "node".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown variant `Robot` for `Node` at `node`"
        );
    }
}
