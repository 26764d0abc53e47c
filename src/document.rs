//! Swagger 2.0 object model.
//!
//! [`Swagger`] is generic over its path and definition values so the same
//! envelope serves both generated documents (fully typed) and aggregated
//! documents, whose paths and definitions are carried through as raw JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{HttpMethod, BASIC_AUTH, JSON_MEDIA_TYPE};

/// A generated specification document.
pub type SpecificationDocument = Swagger<PathItem, Schema>;

/// A merged document whose paths and definitions are opaque JSON.
pub type AggregatedDocument = Swagger<Value, Value>;

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger<P, M> {
    #[serde(default)]
    pub swagger: String,
    #[serde(default)]
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<Scheme>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub paths: IndexMap<String, P>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_definitions: IndexMap<String, SecurityScheme>,
    #[serde(default)]
    pub definitions: IndexMap<String, M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl<P, M> Swagger<P, M> {
    /// An empty 2.0 document with the given info block.
    pub fn new(info: Info) -> Self {
        Self {
            swagger: "2.0".to_string(),
            info,
            host: None,
            base_path: None,
            schemes: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            security: Vec::new(),
            paths: IndexMap::new(),
            security_definitions: IndexMap::new(),
            definitions: IndexMap::new(),
            external_docs: None,
        }
    }

    /// Register HTTP basic auth as the only security requirement.
    pub fn with_basic_auth(mut self) -> Self {
        self.security_definitions
            .insert(BASIC_AUTH.to_string(), SecurityScheme::basic());
        let mut requirement = IndexMap::new();
        requirement.insert(BASIC_AUTH.to_string(), Vec::new());
        self.security.push(requirement);
        self
    }

    /// Set `application/json` as the global consumes and produces type.
    pub fn with_json_media_type(mut self) -> Self {
        self.consumes = vec![JSON_MEDIA_TYPE.to_string()];
        self.produces = vec![JSON_MEDIA_TYPE.to_string()];
        self
    }
}

impl SpecificationDocument {
    /// Every `$ref` used anywhere in the document, in document order.
    pub fn references(&self) -> Vec<String> {
        let mut refs = Vec::new();
        for item in self.paths.values() {
            for (_, operation) in item.operations() {
                for parameter in &operation.parameters {
                    if let Some(schema) = &parameter.schema {
                        schema.collect_references(&mut refs);
                    }
                }
                for response in operation.responses.values() {
                    if let Some(schema) = &response.schema {
                        schema.collect_references(&mut refs);
                    }
                }
            }
        }
        for model in self.definitions.values() {
            model.collect_references(&mut refs);
        }
        refs
    }

    /// References whose target is not a key of `definitions`.
    pub fn dangling_references(&self) -> Vec<String> {
        self.references()
            .into_iter()
            .filter(|r| !self.resolves(r))
            .collect()
    }

    /// Whether a `#/definitions/...` reference points at an existing definition.
    pub fn resolves(&self, reference: &str) -> bool {
        reference
            .strip_prefix(DEFINITIONS_PREFIX)
            .map(|name| self.definitions.contains_key(name))
            .unwrap_or(false)
    }
}

/// API metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Contact {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl License {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
    Ws,
    Wss,
}

/// Security scheme definition. Fields other than `type` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl SecurityScheme {
    pub fn basic() -> Self {
        Self {
            kind: "basic".to_string(),
            extra: IndexMap::new(),
        }
    }
}

/// Operations available on one URL template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// Present operations keyed by lowercase verb.
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Operation)> {
        [
            ("get", self.get.as_ref()),
            ("put", self.put.as_ref()),
            ("post", self.post.as_ref()),
            ("delete", self.delete.as_ref()),
            ("patch", self.patch.as_ref()),
        ]
        .into_iter()
        .filter_map(|(verb, op)| op.map(|op| (verb, op)))
    }

    pub fn is_empty(&self) -> bool {
        self.operations().next().is_none()
    }

    /// Slot for `method`, replacing any operation already there.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
        };
        *slot = Some(operation);
    }
}

/// A single HTTP operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

impl Operation {
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.consumes.push(media_type.into());
        self
    }

    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.produces.push(media_type.into());
        self
    }

    pub fn parameter(&mut self, parameter: Parameter) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    pub fn response(&mut self, status: u16, response: Response) -> &mut Self {
        self.responses.insert(status.to_string(), response);
        self
    }

    pub fn find_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Body,
    Header,
}

/// Operation parameter. Body parameters carry a `schema`, the rest a `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<SchemaType>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Parameter {
    /// Optional query parameter of the given type.
    pub fn query(name: impl Into<String>, param_type: SchemaType) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            description: None,
            required: false,
            param_type: Some(param_type),
            enum_values: Vec::new(),
            schema: None,
        }
    }

    /// Required string path parameter.
    pub fn path(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Path,
            description: Some(description.into()),
            required: true,
            param_type: Some(SchemaType::String),
            enum_values: Vec::new(),
            schema: None,
        }
    }

    /// Required body parameter.
    pub fn body(name: impl Into<String>, description: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Body,
            description: Some(description.into()),
            required: true,
            param_type: None,
            enum_values: Vec::new(),
            schema: Some(schema),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Schema object, used for both definitions and their properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
}

impl Schema {
    fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::typed(SchemaType::String)
    }

    pub fn integer() -> Self {
        Self::typed(SchemaType::Integer).with_format("int32")
    }

    pub fn double() -> Self {
        Self::typed(SchemaType::Number).with_format("double")
    }

    pub fn boolean() -> Self {
        Self::typed(SchemaType::Boolean)
    }

    pub fn date() -> Self {
        Self::string().with_format("date")
    }

    pub fn object() -> Self {
        Self::typed(SchemaType::Object)
    }

    /// Array schema; `items` may be absent for untyped collections.
    pub fn array(items: Option<Schema>) -> Self {
        Self {
            items: items.map(Box::new),
            ..Self::typed(SchemaType::Array)
        }
    }

    /// Reference to a named definition.
    pub fn reference(definition: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, definition)),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_enum(mut self, values: Vec<String>) -> Self {
        self.enum_values = values;
        self
    }

    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Name of the referenced definition, when this is a local reference.
    pub fn referenced_definition(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITIONS_PREFIX))
    }

    fn collect_references(&self, out: &mut Vec<String>) {
        if let Some(reference) = &self.reference {
            out.push(reference.clone());
        }
        if let Some(items) = &self.items {
            items.collect_references(out);
        }
        for property in self.properties.values() {
            property.collect_references(out);
        }
    }
}
