//! typed graphql bindings and http transport
//!
//! this crate has two halves. the generator reads a schema and a document
//! of named operations, resolves every selection against the schema, and
//! synthesizes named input and response shapes ([`generate`],
//! [`render_bindings`], or the `gqlbind-codegen` binary). the transport
//! ([`Client`]) sends the generated requests as POST json, GET query
//! parameters, or multipart uploads.
//!
//! ## quick start
//!
//! ```no_run
//! use gqlbind::{Client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:8000/graphql"))?;
//! let response = client.execute_raw("query Ping { ping }", None).await?;
//! println!("{:?}", response.data);
//! # Ok(())
//! # }
//! ```
//!
//! ## generating bindings
//!
//! ```
//! use gqlbind::{generate, render_bindings, CodegenOptions, Schema};
//!
//! let schema = Schema::parse("type Query { hello: String! }").unwrap();
//! let options = CodegenOptions::default();
//! let generated = generate(&schema, "query Hello { hello }", &options).unwrap();
//! assert!(generated.failures.is_empty());
//! let source = render_bindings(&generated.bindings, &options);
//! assert!(source.contains("pub struct HelloResponse"));
//! ```

mod client;
mod config;
mod decode;
mod error;
mod graphql;
mod multipart;
mod naming;
mod operation;
mod polymorphic;
mod render;
mod request;
mod resolve;
mod schema;
mod synth;
mod upload;
mod variables;

pub use client::{Client, GraphQlClient};
pub use config::{ClientConfig, RequestMethod};
pub use decode::{Decoded, DecodedObject};
pub use error::{DecodeError, Error, Result, ValidationError};
pub use graphql::{GraphQlError, GraphQlErrorList, GraphQlLocation, GraphQlResponse};
pub use multipart::{pack as pack_multipart, FileMap, FilePart, MultipartBody};
pub use operation::Operation;
pub use polymorphic::{decode_polymorphic, deserialize_polymorphic, Polymorphic, DISCRIMINATOR};
pub use render::render_bindings;
pub use request::Request;
pub use resolve::{
    request_discriminators, resolve, OperationKind, ResolvedField, ResolvedOperation,
    ResolvedSelection, ResolvedVariable, ResolvedVariant,
};
pub use schema::{FieldDef, InputValueDef, Schema, TypeDef, TypeKind, TypeRef};
pub use synth::{
    generate, synthesize, BindingSet, CodegenOptions, EnumShape, FieldType, Generated,
    InputField, InputShape, PolymorphicShape, ResponseShape, ShapeField, VariantShape,
};
pub use tokio_util::sync::CancellationToken;
pub use upload::{sniff_content_type, SharedReader, Upload, UploadSource};
pub use variables::{Optional, Shape, ToShape, Variables};
