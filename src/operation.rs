//! generated operation helper
//!
//! operation trait implemented by generated types.

use crate::request::Request;
use crate::variables::Variables;
use serde::de::DeserializeOwned;

/// graphql operation contract for generated types
pub trait Operation {
    /// operation name as written in the document
    const NAME: &'static str;
    /// graphql query or mutation string
    const QUERY: &'static str;
    /// send as a multipart upload request
    const UPLOADS: bool = false;
    /// operation input type
    type Variables: Variables;
    /// response payload type
    type Response: DeserializeOwned;

    /// build the request envelope for these variables
    fn request(variables: Self::Variables) -> Request<Self::Variables> {
        let request = Request::new(Self::QUERY, Self::NAME, Some(variables));
        if Self::UPLOADS {
            request.with_multipart_upload()
        } else {
            request
        }
    }
}
