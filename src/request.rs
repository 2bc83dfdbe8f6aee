//! request envelope
//!
//! the transport-level payload sent for one operation.

use crate::variables::Variables;
use serde::Serialize;
use std::borrow::Cow;

/// operation name, literal query text, variables, and the upload flag
///
/// serializes to the standard `{"query", "variables", "operationName"}`
/// json payload; the upload flag never goes over the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Request<V> {
    /// literal query text, e.g. `query GetUser { user { id } }`
    pub query: Cow<'static, str>,
    /// variables, or `None` if the operation declares none
    pub variables: Option<V>,
    /// operation name, sent unconditionally
    #[serde(rename = "operationName")]
    pub operation_name: Cow<'static, str>,
    /// send as a multipart file upload request
    #[serde(skip)]
    pub upload_files: bool,
}

impl<V: Variables> Request<V> {
    pub fn new(
        query: impl Into<Cow<'static, str>>,
        operation_name: impl Into<Cow<'static, str>>,
        variables: Option<V>,
    ) -> Self {
        Self {
            query: query.into(),
            variables,
            operation_name: operation_name.into(),
            upload_files: false,
        }
    }

    /// switch this request to multipart file upload mode
    ///
    /// ignored by clients configured for GET.
    pub fn with_multipart_upload(mut self) -> Self {
        self.upload_files = true;
        self
    }

    /// true if the query text is a mutation
    pub fn is_mutation(&self) -> bool {
        self.query.trim_start().starts_with("mutation")
    }
}
