//! API Flow
//!
//! Conversion between API description formats through one shared model.
//!
//! A source document (Swagger 2.0 or the internal JSON model) is parsed into an
//! [`Api`]: resources, requests, parameters and responses, with shared definitions
//! kept in a [`Store`] and pointed to by [`Reference`]s. A serializer then writes
//! the model out in the target format.
//!
//! # Example
//!
//! ```
//! use api_flow::{convert, ConvertOptions, Format};
//!
//! let swagger = r#"{
//!     "swagger": "2.0",
//!     "info": { "title": "Petstore", "version": "1.0.0" },
//!     "paths": {
//!         "/pets": {
//!             "get": { "responses": { "200": { "description": "ok" } } }
//!         }
//!     }
//! }"#;
//!
//! let raml = convert(swagger, &ConvertOptions::new(Format::Raml)).unwrap();
//! assert!(raml.starts_with("#%RAML 1.0"));
//! assert!(raml.contains("/pets:"));
//! ```
//!
//! # Formats
//!
//! | Format | Read | Write |
//! |--------|------|-------|
//! | `swagger` (2.0) | yes | no |
//! | `internal` (JSON model) | yes | yes |
//! | `raml` (1.0) | no | yes |
//!
//! # Schema demotion
//!
//! Named JSON-Schemas are declared as native RAML types when they, and every
//! schema they reference, avoid keywords RAML cannot express (`oneOf`, `not`,
//! `patternProperties`, ...). The others are written as raw JSON-Schema strings.
//! With [`ConvertOptions::strict`] demotion is an error instead.

mod auth;
mod constraint;
mod container;
mod context;
mod deferred;
mod error;
pub mod formats;
mod graph;
mod loader;
mod model;
mod parameter;
mod reference;
mod store;
mod types;
mod url;

pub use auth::{
    ApiKeyAuth, ApiKeyLocation, Auth, AwsSig4Auth, BasicAuth, CustomAuth, DigestAuth, HawkAuth,
    OAuth1Auth, OAuth2Auth, OAuth2Flow, Scope,
};
pub use constraint::{merge_into, Constraint};
pub use container::ParameterContainer;
pub use context::Context;
pub use deferred::{ExoticReference, JsonSchemaReference, LateResolutionReference};
pub use error::{ConvertError, LoadError, ParseError, SerializeError};
pub use formats::{convert, detect, parse, Parser, Serializer};
pub use graph::{is_convertible, ref_name, refs_from_schema, DependencyNode, SchemaGraph};
pub use loader::{
    is_url, load_document, load_document_auto, load_document_str, navigate_fragment,
    read_source, read_source_auto,
};
pub use model::{
    Api, Contact, Group, GroupChild, Info, Interface, License, Request, Resource, Response,
    Variable,
};
pub use parameter::{Location, Parameter, ParameterValue, SchemaOptions, SuperType};
pub use reference::{deep_merge, Indirect, Link, RefType, Reference};
pub use store::{Store, Stored};
pub use types::{ConvertOptions, Detection, Format};
pub use url::{Url, UrlComponent};

#[cfg(feature = "remote")]
pub use loader::{fetch_source, load_document_url};
