//! Ports the generator core consumes.
//!
//! A [`ResourceHandler`] is one REST resource implementation. Its entry points
//! default to [`HandlerError::UnsupportedOperation`], so an implementation
//! overrides exactly the operations it supports. [`SearchHandler`] and
//! [`DomainModel`] describe named searches and the domain types behind
//! resources.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::HandlerError;
use crate::types::{strip_version_prefix, Representation};

/// Loosely typed request body.
pub type SimpleObject = Map<String, Value>;

/// Result of invoking a handler entry point.
pub type HandlerResult = Result<Value, HandlerError>;

/// Request parameters handed to entry points.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub representation: Representation,
    pub limit: Option<u32>,
    pub start_index: Option<u32>,
    pub parameters: BTreeMap<String, String>,
}

/// Where a resource lives in the URL space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceIdentity {
    /// Top-level resource. `name` carries its version prefix, e.g. `v1/concept`.
    Resource { name: String, supported_class: String },
    /// Resource nested under `parent_name` (also version-prefixed) at `path`.
    SubResource {
        parent_name: String,
        path: String,
        supported_class: String,
    },
}

impl ResourceIdentity {
    /// Resource name without version prefix; the sub-resource path for sub-resources.
    pub fn resource_name(&self) -> &str {
        match self {
            ResourceIdentity::Resource { name, .. } => strip_version_prefix(name),
            ResourceIdentity::SubResource { path, .. } => path,
        }
    }

    /// Parent resource name without version prefix.
    pub fn parent_name(&self) -> Option<&str> {
        match self {
            ResourceIdentity::Resource { .. } => None,
            ResourceIdentity::SubResource { parent_name, .. } => {
                Some(strip_version_prefix(parent_name))
            }
        }
    }

    pub fn supported_class(&self) -> &str {
        match self {
            ResourceIdentity::Resource {
                supported_class, ..
            }
            | ResourceIdentity::SubResource {
                supported_class, ..
            } => supported_class,
        }
    }

    pub fn is_subresource(&self) -> bool {
        matches!(self, ResourceIdentity::SubResource { .. })
    }
}

/// A type argument in a generic supertype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeArgument {
    /// A concrete class, by qualified name.
    Class(String),
    /// An unbound type variable such as `T`.
    Variable(String),
}

/// A possibly parameterised supertype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericType {
    pub name: String,
    #[serde(default)]
    pub type_arguments: Vec<TypeArgument>,
}

impl GenericType {
    /// The first type argument, if it is a concrete class.
    pub fn concrete_argument(&self) -> Option<&str> {
        match self.type_arguments.first() {
            Some(TypeArgument::Class(name)) => Some(name),
            _ => None,
        }
    }
}

/// Supertypes declared at one level of a handler's class hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeLevel {
    #[serde(default)]
    pub interfaces: Vec<GenericType>,
    #[serde(default)]
    pub superclass: Option<GenericType>,
}

/// Declared type of a domain field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Uuid,
    Date,
    Double,
    /// Any other class, by qualified name.
    Class { name: String },
    /// A set or list, with its element class when known.
    Collection {
        #[serde(default)]
        element: Option<String>,
    },
}

/// Property names exposed by one representation or write mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescription {
    pub properties: Vec<String>,
}

impl ResourceDescription {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

/// One REST resource implementation.
pub trait ResourceHandler {
    /// Simple class name of the implementation, e.g. `ConceptResource1_8`.
    fn class_name(&self) -> &str;

    fn identity(&self) -> Result<ResourceIdentity, HandlerError>;

    /// Supertypes from the handler itself up to the root, nearest first.
    fn type_hierarchy(&self) -> Vec<TypeLevel> {
        Vec::new()
    }

    /// Whether the resource declares several concrete subtypes.
    fn has_types_defined(&self) -> bool {
        false
    }

    /// Whether this handler only dispatches to a subclass of another resource.
    fn is_delegating_subclass_handler(&self) -> bool {
        false
    }

    fn get_all(&self, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("getAll"))
    }

    fn get_by_unique_id(&self, _uuid: &str) -> HandlerResult {
        Err(HandlerError::unsupported("getByUniqueId"))
    }

    fn search(&self, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("search"))
    }

    fn create(&self, _body: &SimpleObject, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("create"))
    }

    fn update(&self, _uuid: &str, _body: &SimpleObject, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("update"))
    }

    fn delete(&self, _uuid: &str, _reason: &str, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("delete"))
    }

    fn purge(&self, _uuid: &str, _context: &RequestContext) -> HandlerResult {
        Err(HandlerError::unsupported("purge"))
    }

    fn representation_description(
        &self,
        _representation: Representation,
    ) -> Result<Option<ResourceDescription>, HandlerError> {
        Ok(None)
    }

    fn creatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        Ok(None)
    }

    fn updatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        Ok(None)
    }
}

/// A named search parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameter {
    pub name: String,
}

impl SearchParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One search variant: the parameters it needs and the ones it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required_parameters: Vec<SearchParameter>,
    #[serde(default)]
    pub optional_parameters: Vec<SearchParameter>,
}

/// Search capability registered for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Versioned resource path, e.g. `v1/person` or `v1/concept/name`.
    pub supported_resource: String,
    #[serde(default)]
    pub search_queries: Vec<SearchQuery>,
}

/// A handler exposing one search configuration.
pub trait SearchHandler {
    fn search_config(&self) -> Result<SearchConfig, HandlerError>;
}

impl SearchHandler for SearchConfig {
    fn search_config(&self) -> Result<SearchConfig, HandlerError> {
        Ok(self.clone())
    }
}

/// Read access to the domain types behind resources.
pub trait DomainModel {
    /// Declared type of `field` on `class`, or `None` if no such field exists.
    fn field_type(&self, class: &str, field: &str) -> Option<FieldType>;

    /// Constants of `class` if it is an enum.
    fn enum_constants(&self, class: &str) -> Option<Vec<String>>;
}

/// A domain model that knows no types; every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDomainModel;

impl DomainModel for EmptyDomainModel {
    fn field_type(&self, _class: &str, _field: &str) -> Option<FieldType> {
        None
    }

    fn enum_constants(&self, _class: &str) -> Option<Vec<String>> {
        None
    }
}
