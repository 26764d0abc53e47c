//! restdoc
//!
//! Swagger 2.0 generation from REST resource handlers, and aggregation of
//! several generated documents into one.
//!
//! Generation inspects each [`ResourceHandler`]: entry points that answer
//! with anything other than [`HandlerError::UnsupportedOperation`] become
//! operations, and the handler's representation descriptions become
//! definitions.
//!
//! # Example
//!
//! ```
//! use restdoc::{
//!     GeneratorConfig, HandlerResult, RequestContext, ResourceHandler, ResourceIdentity,
//!     HandlerError, SpecificationBuilder,
//! };
//! use serde_json::json;
//!
//! struct Concept;
//!
//! impl ResourceHandler for Concept {
//!     fn class_name(&self) -> &str {
//!         "ConceptResource1_8"
//!     }
//!     fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
//!         Ok(ResourceIdentity::Resource {
//!             name: "v1/concept".into(),
//!             supported_class: "org.openmrs.Concept".into(),
//!         })
//!     }
//!     fn get_all(&self, _context: &RequestContext) -> HandlerResult {
//!         Ok(json!([]))
//!     }
//! }
//!
//! let doc = SpecificationBuilder::new(GeneratorConfig::default())
//!     .resource(&Concept)
//!     .build();
//!
//! let get = doc.paths["/concept"].get.as_ref().unwrap();
//! assert_eq!(get.operation_id.as_deref(), Some("getAllConcepts"));
//! assert!(doc.paths.get("/concept/{uuid}").is_none());
//! ```
//!
//! # Operations
//!
//! | Entry point | Collection path | Item path |
//! |-------------|-----------------|-----------|
//! | `get_all` | `GET` | |
//! | `search` | `GET` (search form) | |
//! | `create` | `POST` | |
//! | `get_by_unique_id` | | `GET` |
//! | `update` | | `POST` |
//! | `delete` | | `DELETE` |
//! | `purge` | | `DELETE` with `purge` |
//!
//! Sub-resources live under `/<parent>/{parent-uuid}/<name>`.

mod aggregate;
mod builder;
mod catalog;
mod document;
mod error;
mod handler;
mod index;
mod loader;
mod naming;
mod operation;
mod paths;
mod probe;
mod properties;
mod search;
mod types;
mod validator;

pub use aggregate::{
    aggregate, aggregate_directory, extract_base_path, extract_host, load_sources,
    AggregateWarning, Aggregation, AggregatorConfig, SourceDocument,
};
pub use builder::{
    generate_from_catalog, output_filename, repair_dangling_references, to_json,
    write_specification, GeneratorConfig, SpecificationBuilder,
};
pub use catalog::{
    Behavior, Catalog, CatalogDomain, CatalogEntry, CatalogResource, DomainType,
    Representations, ResourceAnnotation, ResourceClass,
};
pub use document::{
    AggregatedDocument, Contact, ExternalDocs, Info, License, Operation, Parameter,
    ParameterLocation, PathItem, Response, Schema, SchemaType, Scheme, SecurityScheme,
    SpecificationDocument, Swagger,
};
pub use error::{
    AggregateError, CatalogError, GenerateError, HandlerError, LoadError, OutputError,
    SchemaError,
};
pub use handler::{
    DomainModel, EmptyDomainModel, FieldType, GenericType, HandlerResult, RequestContext,
    ResourceDescription, ResourceHandler, ResourceIdentity, SearchConfig, SearchHandler,
    SearchParameter, SearchQuery, SimpleObject, TypeArgument, TypeLevel,
};
pub use index::ResourceIndex;
pub use loader::{is_url, load_document, load_document_auto, load_document_str};
pub use naming::{operation_title, pluralize};
pub use probe::{is_implemented, probe};
pub use properties::{supported_type, PropertyResolver, DEFAULT_DOMAIN_NAMESPACE};
pub use types::{
    model_title, Action, Capability, HttpMethod, OperationKind, Representation, SchemaContext,
    SchemaFamily, IMPOSSIBLE_UNIQUE_ID,
};
pub use validator::{check_structure, validate_against_schema};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
