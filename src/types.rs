//! Core types shared by the generation pipeline.

use serde::{Deserialize, Serialize};

/// Identifier passed to probes; no real record should ever carry it.
pub const IMPOSSIBLE_UNIQUE_ID: &str = "SWAGGER_IMPOSSIBLE_UNIQUE_ID";

/// Media type used for request and response bodies.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Extra media type advertised by search-only operations.
pub const XML_MEDIA_TYPE: &str = "application/xml";

/// Name of the shared definition returned by fetch-all and search operations.
pub const FETCH_ALL_DEFINITION: &str = "FetchAll";

/// Name of the HTTP basic security scheme.
pub const BASIC_AUTH: &str = "basic_auth";

/// Values accepted by the `v` representation parameter.
pub const REPRESENTATION_VALUES: &[&str] = &["ref", "default", "full", "custom"];

/// Named property-set view of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Representation {
    Ref,
    #[default]
    Default,
    Full,
}

impl Representation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Representation::Ref => "ref",
            Representation::Default => "default",
            Representation::Full => "full",
        }
    }
}

/// A handler entry point whose presence is probed at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    FetchAll,
    FetchById,
    Search,
    Create,
    Update,
    Delete,
    Purge,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::FetchAll,
        Action::FetchById,
        Action::Search,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Purge,
    ];

    /// Name of the handler entry point, as used in log lines.
    pub fn entry_point(&self) -> &'static str {
        match self {
            Action::FetchAll => "getAll",
            Action::FetchById => "getByUniqueId",
            Action::Search => "search",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Purge => "purge",
        }
    }
}

/// Outcome of probing one entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The entry point ran to completion.
    Implemented,
    /// The entry point raised the unsupported-operation signal.
    Unsupported,
    /// The entry point failed for an unrelated reason. Counted as implemented.
    Assumed,
}

impl Capability {
    pub fn is_implemented(&self) -> bool {
        !matches!(self, Capability::Unsupported)
    }
}

/// HTTP verbs used by generated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// Operation templates, one per action for top-level and sub-resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    FetchAll,
    FetchAllSubresource,
    FetchById,
    FetchByIdSubresource,
    Search,
    SearchSubresource,
    Create,
    CreateSubresource,
    Update,
    UpdateSubresource,
    Delete,
    DeleteSubresource,
    Purge,
    PurgeSubresource,
}

impl OperationKind {
    /// Select the template for an action on a resource with or without a parent.
    pub fn new(action: Action, subresource: bool) -> Self {
        use OperationKind::*;
        match (action, subresource) {
            (Action::FetchAll, false) => FetchAll,
            (Action::FetchAll, true) => FetchAllSubresource,
            (Action::FetchById, false) => FetchById,
            (Action::FetchById, true) => FetchByIdSubresource,
            (Action::Search, false) => Search,
            (Action::Search, true) => SearchSubresource,
            (Action::Create, false) => Create,
            (Action::Create, true) => CreateSubresource,
            (Action::Update, false) => Update,
            (Action::Update, true) => UpdateSubresource,
            (Action::Delete, false) => Delete,
            (Action::Delete, true) => DeleteSubresource,
            (Action::Purge, false) => Purge,
            (Action::Purge, true) => PurgeSubresource,
        }
    }

    pub fn action(&self) -> Action {
        use OperationKind::*;
        match self {
            FetchAll | FetchAllSubresource => Action::FetchAll,
            FetchById | FetchByIdSubresource => Action::FetchById,
            Search | SearchSubresource => Action::Search,
            Create | CreateSubresource => Action::Create,
            Update | UpdateSubresource => Action::Update,
            Delete | DeleteSubresource => Action::Delete,
            Purge | PurgeSubresource => Action::Purge,
        }
    }

    pub fn is_subresource(&self) -> bool {
        use OperationKind::*;
        matches!(
            self,
            FetchAllSubresource
                | FetchByIdSubresource
                | SearchSubresource
                | CreateSubresource
                | UpdateSubresource
                | DeleteSubresource
                | PurgeSubresource
        )
    }

    pub fn method(&self) -> HttpMethod {
        match self.action() {
            Action::FetchAll | Action::FetchById | Action::Search => HttpMethod::Get,
            Action::Create | Action::Update => HttpMethod::Post,
            Action::Delete | Action::Purge => HttpMethod::Delete,
        }
    }

    /// Schema family the operation's `$ref`s point into, if any.
    pub fn schema_family(&self) -> Option<SchemaFamily> {
        match self.action() {
            Action::FetchAll | Action::FetchById => Some(SchemaFamily::Get),
            Action::Create => Some(SchemaFamily::Create),
            Action::Update => Some(SchemaFamily::Update),
            Action::Search | Action::Delete | Action::Purge => None,
        }
    }
}

/// Group of definitions generated together for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFamily {
    Get,
    Create,
    Update,
}

impl SchemaFamily {
    pub fn suffix(&self) -> &'static str {
        match self {
            SchemaFamily::Get => "Get",
            SchemaFamily::Create => "Create",
            SchemaFamily::Update => "Update",
        }
    }
}

/// The definition a property is being resolved for.
///
/// References to other resources reuse the same suffix, so a `GetFull`
/// model points at other resources' `GetFull` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaContext {
    Get,
    GetRef,
    GetFull,
    Create,
    CreateFull,
    Update,
}

impl SchemaContext {
    pub fn suffix(&self) -> &'static str {
        match self {
            SchemaContext::Get => "Get",
            SchemaContext::GetRef => "GetRef",
            SchemaContext::GetFull => "GetFull",
            SchemaContext::Create => "Create",
            SchemaContext::CreateFull => "CreateFull",
            SchemaContext::Update => "Update",
        }
    }
}

/// Strip the version prefix (everything up to the first `/`) from a resource name.
pub fn strip_version_prefix(name: &str) -> &str {
    match name.split_once('/') {
        Some((_, rest)) => rest,
        None => name,
    }
}

/// Upper-case the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Definition title for a resource: every `/`-separated segment capitalized and joined.
///
/// `concept` becomes `Concept`; sub-resource `name` of `concept` becomes `ConceptName`.
pub fn model_title(resource_name: &str, parent_name: Option<&str>) -> String {
    parent_name
        .into_iter()
        .chain(std::iter::once(resource_name))
        .flat_map(|name| name.split('/'))
        .map(capitalize)
        .collect()
}
