//! JSON resource catalog: the discovery and domain-model adapter.
//!
//! Package names map to directories under a classes directory (`.` becomes
//! `/`). Every `*.json` file below a package directory holds one
//! [`CatalogEntry`], tagged by `kind`:
//!
//! ```json
//! {
//!   "kind": "resource",
//!   "className": "org.openmrs.module.webservices.rest.web.v1_0.resource.ConceptResource1_8",
//!   "annotation": { "type": "resource", "name": "v1/concept", "supportedClass": "org.openmrs.Concept" },
//!   "operations": { "fetchAll": "implemented", "fetchById": "failing" },
//!   "representations": { "default": ["names", "datatype"] }
//! }
//! ```
//!
//! Entries of kind `searchHandler` carry a search configuration and entries
//! of kind `domainType` describe the fields of a domain class.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, HandlerError};
use crate::handler::{
    DomainModel, FieldType, HandlerResult, RequestContext, ResourceDescription, ResourceHandler,
    ResourceIdentity, SearchConfig, SearchHandler, SimpleObject, TypeLevel,
};
use crate::loader::{collect_json_files, load_document};
use crate::types::{Action, Representation};

/// One catalog file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CatalogEntry {
    Resource(ResourceClass),
    SearchHandler(SearchConfig),
    DomainType(DomainType),
}

/// Description of one resource handler class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClass {
    /// Qualified class name.
    pub class_name: String,
    pub annotation: ResourceAnnotation,
    #[serde(default)]
    pub type_hierarchy: Vec<TypeLevel>,
    /// Entry point behaviour; absent entries are unsupported.
    #[serde(default)]
    pub operations: BTreeMap<Action, Behavior>,
    #[serde(default)]
    pub representations: Representations,
    #[serde(default)]
    pub creatable: Option<Vec<String>>,
    #[serde(default)]
    pub updatable: Option<Vec<String>>,
    #[serde(default)]
    pub has_types_defined: bool,
    #[serde(default)]
    pub delegating_subclass_handler: bool,
}

impl ResourceClass {
    /// Class name without its package.
    pub fn simple_name(&self) -> &str {
        self.class_name
            .rsplit_once('.')
            .map_or(self.class_name.as_str(), |(_, name)| name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceAnnotation {
    #[serde(rename_all = "camelCase")]
    Resource { name: String, supported_class: String },
    /// `parent` names the parent handler class.
    #[serde(rename_all = "camelCase")]
    SubResource {
        parent: String,
        path: String,
        supported_class: String,
    },
}

/// How an entry point responds when probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    Implemented,
    Unsupported,
    /// Fails with an error other than the unsupported signal.
    Failing,
}

/// Property names per representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representations {
    #[serde(rename = "ref", default)]
    pub reference: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<Vec<String>>,
    #[serde(default)]
    pub full: Option<Vec<String>>,
}

/// Fields of one domain class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainType {
    pub name: String,
    /// Present when the class is an enum.
    #[serde(default)]
    pub enum_constants: Option<Vec<String>>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldType>,
}

/// A catalog resource acting as a [`ResourceHandler`].
#[derive(Debug, Clone)]
pub struct CatalogResource {
    class: ResourceClass,
    identity: Result<ResourceIdentity, HandlerError>,
}

impl CatalogResource {
    fn respond(&self, action: Action) -> HandlerResult {
        match self.class.operations.get(&action) {
            Some(Behavior::Implemented) => Ok(Value::Object(SimpleObject::new())),
            Some(Behavior::Failing) => Err(HandlerError::failed(format!(
                "{} failed",
                action.entry_point()
            ))),
            Some(Behavior::Unsupported) | None => Err(HandlerError::unsupported(action.entry_point())),
        }
    }
}

fn description(properties: &Option<Vec<String>>) -> Result<Option<ResourceDescription>, HandlerError> {
    Ok(properties
        .as_ref()
        .map(|names| ResourceDescription::new(names.iter().cloned())))
}

impl ResourceHandler for CatalogResource {
    fn class_name(&self) -> &str {
        self.class.simple_name()
    }

    fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
        self.identity.clone()
    }

    fn type_hierarchy(&self) -> Vec<TypeLevel> {
        self.class.type_hierarchy.clone()
    }

    fn has_types_defined(&self) -> bool {
        self.class.has_types_defined
    }

    fn is_delegating_subclass_handler(&self) -> bool {
        self.class.delegating_subclass_handler
    }

    fn get_all(&self, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::FetchAll)
    }

    fn get_by_unique_id(&self, _uuid: &str) -> HandlerResult {
        self.respond(Action::FetchById)
    }

    fn search(&self, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::Search)
    }

    fn create(&self, _body: &SimpleObject, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::Create)
    }

    fn update(&self, _uuid: &str, _body: &SimpleObject, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::Update)
    }

    fn delete(&self, _uuid: &str, _reason: &str, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::Delete)
    }

    fn purge(&self, _uuid: &str, _context: &RequestContext) -> HandlerResult {
        self.respond(Action::Purge)
    }

    fn representation_description(
        &self,
        representation: Representation,
    ) -> Result<Option<ResourceDescription>, HandlerError> {
        let representations = &self.class.representations;
        description(match representation {
            Representation::Ref => &representations.reference,
            Representation::Default => &representations.default,
            Representation::Full => &representations.full,
        })
    }

    fn creatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        description(&self.class.creatable)
    }

    fn updatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        description(&self.class.updatable)
    }
}

/// Domain types of a catalog, keyed by qualified name.
#[derive(Debug, Clone, Default)]
pub struct CatalogDomain {
    types: HashMap<String, DomainType>,
}

impl DomainModel for CatalogDomain {
    fn field_type(&self, class: &str, field: &str) -> Option<FieldType> {
        self.types.get(class)?.fields.get(field).cloned()
    }

    fn enum_constants(&self, class: &str) -> Option<Vec<String>> {
        self.types.get(class)?.enum_constants.clone()
    }
}

/// Everything discovered in a classes directory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: Vec<CatalogResource>,
    search_configs: Vec<SearchConfig>,
    domain: CatalogDomain,
}

impl Catalog {
    /// Scan `packages` under `classes_dir`.
    ///
    /// Missing directories and unreadable entries are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadDir` if an existing package directory
    /// cannot be listed.
    pub fn scan<S: AsRef<str>>(classes_dir: &Path, packages: &[S]) -> Result<Self, CatalogError> {
        if !classes_dir.is_dir() {
            warn!(path = %classes_dir.display(), "classes directory not found");
            return Ok(Self::default());
        }

        let mut files = BTreeSet::new();
        for package in packages.iter().map(|p| p.as_ref().trim()).filter(|p| !p.is_empty()) {
            let package_dir: PathBuf = classes_dir.join(package.replace('.', "/"));
            if !package_dir.is_dir() {
                warn!(package, path = %package_dir.display(), "package directory not found");
                continue;
            }
            debug!(package, "scanning package");
            let found = collect_json_files(&package_dir, true).map_err(|source| CatalogError::ReadDir {
                path: package_dir.clone(),
                source,
            })?;
            files.extend(found);
        }

        let mut entries = Vec::with_capacity(files.len());
        for file in &files {
            match load_document::<CatalogEntry>(file) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(error = %e, "skipping catalog entry"),
            }
        }

        let catalog = Self::from_entries(entries);
        info!(
            resources = catalog.resources.len(),
            search_handlers = catalog.search_configs.len(),
            "scanned resource catalog"
        );
        Ok(catalog)
    }

    /// Build a catalog from parsed entries, resolving sub-resource parents.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut classes = Vec::new();
        let mut catalog = Self::default();
        for entry in entries {
            match entry {
                CatalogEntry::Resource(class) => classes.push(class),
                CatalogEntry::SearchHandler(config) => catalog.search_configs.push(config),
                CatalogEntry::DomainType(domain_type) => {
                    catalog
                        .domain
                        .types
                        .insert(domain_type.name.clone(), domain_type);
                }
            }
        }

        let mut names: HashMap<&str, &str> = HashMap::new();
        for class in &classes {
            if let ResourceAnnotation::Resource { name, .. } = &class.annotation {
                names.insert(class.class_name.as_str(), name.as_str());
                names.entry(class.simple_name()).or_insert(name.as_str());
            }
        }

        let identities: Vec<_> = classes
            .iter()
            .map(|class| match &class.annotation {
                ResourceAnnotation::Resource {
                    name,
                    supported_class,
                } => Ok(ResourceIdentity::Resource {
                    name: name.clone(),
                    supported_class: supported_class.clone(),
                }),
                ResourceAnnotation::SubResource {
                    parent,
                    path,
                    supported_class,
                } => match names.get(parent.as_str()) {
                    Some(parent_name) => Ok(ResourceIdentity::SubResource {
                        parent_name: parent_name.to_string(),
                        path: path.clone(),
                        supported_class: supported_class.clone(),
                    }),
                    None => Err(HandlerError::UnknownIdentity {
                        message: format!("parent {} is not a resource", parent),
                    }),
                },
            })
            .collect();

        catalog.resources = classes
            .into_iter()
            .zip(identities)
            .map(|(class, identity)| CatalogResource { class, identity })
            .collect();
        catalog
    }

    pub fn resources(&self) -> impl Iterator<Item = &dyn ResourceHandler> + '_ {
        self.resources.iter().map(|r| r as &dyn ResourceHandler)
    }

    pub fn search_handlers(&self) -> impl Iterator<Item = &dyn SearchHandler> + '_ {
        self.search_configs.iter().map(|c| c as &dyn SearchHandler)
    }

    pub fn domain(&self) -> &CatalogDomain {
        &self.domain
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty() && self.search_configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn entry(value: Value) -> CatalogEntry {
        serde_json::from_value(value).unwrap()
    }

    fn concept() -> Value {
        json!({
            "kind": "resource",
            "className": "org.openmrs.web.resource.ConceptResource1_8",
            "annotation": {"type": "resource", "name": "v1/concept", "supportedClass": "org.openmrs.Concept"},
            "operations": {"fetchAll": "implemented", "fetchById": "failing", "delete": "unsupported"},
            "representations": {"ref": ["uuid"], "default": ["names", "datatype"]},
            "creatable": ["names"]
        })
    }

    fn concept_name(parent: &str) -> Value {
        json!({
            "kind": "resource",
            "className": "org.openmrs.web.resource.ConceptNameResource1_9",
            "annotation": {
                "type": "subResource",
                "parent": parent,
                "path": "name",
                "supportedClass": "org.openmrs.ConceptName"
            }
        })
    }

    #[test]
    fn resource_behaviour_follows_entry() {
        let catalog = Catalog::from_entries(vec![entry(concept())]);
        let handler = catalog.resources().next().unwrap();
        let ctx = RequestContext::default();

        assert_eq!(handler.class_name(), "ConceptResource1_8");
        assert!(handler.get_all(&ctx).is_ok());
        assert!(matches!(handler.get_by_unique_id("x"), Err(HandlerError::Failed { .. })));
        assert!(handler.delete("x", "", &ctx).unwrap_err().is_unsupported());
        assert!(handler.purge("x", &ctx).unwrap_err().is_unsupported());
        assert_eq!(
            handler.representation_description(Representation::Default),
            Ok(Some(ResourceDescription::new(["names", "datatype"])))
        );
        assert_eq!(handler.representation_description(Representation::Full), Ok(None));
        assert_eq!(handler.updatable_properties(), Ok(None));
    }

    #[test]
    fn subresource_parent_resolved_by_class() {
        let catalog = Catalog::from_entries(vec![
            entry(concept_name("org.openmrs.web.resource.ConceptResource1_8")),
            entry(concept()),
        ]);
        let name = catalog
            .resources()
            .find(|r| r.class_name() == "ConceptNameResource1_9")
            .unwrap();

        assert_eq!(
            name.identity(),
            Ok(ResourceIdentity::SubResource {
                parent_name: "v1/concept".into(),
                path: "name".into(),
                supported_class: "org.openmrs.ConceptName".into(),
            })
        );
    }

    #[test]
    fn unknown_parent_is_identity_error() {
        let catalog = Catalog::from_entries(vec![entry(concept_name("org.example.Missing"))]);
        let handler = catalog.resources().next().unwrap();
        assert!(matches!(
            handler.identity(),
            Err(HandlerError::UnknownIdentity { .. })
        ));
    }

    #[test]
    fn domain_types_answer_lookups() {
        let catalog = Catalog::from_entries(vec![
            entry(json!({
                "kind": "domainType",
                "name": "org.openmrs.Concept",
                "fields": {"datatype": {"type": "class", "name": "org.openmrs.ConceptDatatype"}}
            })),
            entry(json!({
                "kind": "domainType",
                "name": "org.openmrs.ConceptNameType",
                "enumConstants": ["FULLY_SPECIFIED", "SHORT"]
            })),
        ]);
        let domain = catalog.domain();

        assert_eq!(
            domain.field_type("org.openmrs.Concept", "datatype"),
            Some(FieldType::Class {
                name: "org.openmrs.ConceptDatatype".into()
            })
        );
        assert_eq!(domain.field_type("org.openmrs.Concept", "missing"), None);
        assert_eq!(
            domain.enum_constants("org.openmrs.ConceptNameType"),
            Some(vec!["FULLY_SPECIFIED".to_string(), "SHORT".to_string()])
        );
        assert_eq!(domain.enum_constants("org.openmrs.Concept"), None);
    }

    #[test]
    fn scan_reads_packages_and_skips_bad_entries() {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("org/openmrs/web/resource");
        fs::create_dir_all(package.join("v1_9")).unwrap();
        fs::write(package.join("concept.json"), concept().to_string()).unwrap();
        fs::write(
            package.join("v1_9/name.json"),
            concept_name("org.openmrs.web.resource.ConceptResource1_8").to_string(),
        )
        .unwrap();
        fs::write(package.join("broken.json"), "{ not json").unwrap();
        fs::write(
            package.join("search.json"),
            json!({"kind": "searchHandler", "supportedResource": "v1/concept"}).to_string(),
        )
        .unwrap();

        let catalog = Catalog::scan(dir.path(), &["org.openmrs.web.resource", "org.missing"]).unwrap();

        assert_eq!(catalog.resources().count(), 2);
        assert_eq!(catalog.search_handlers().count(), 1);
        assert!(catalog.resources().all(|r| r.identity().is_ok()));
    }

    #[test]
    fn scan_missing_classes_dir_is_empty() {
        let catalog = Catalog::scan(Path::new("/nonexistent/classes"), &["org.openmrs"]).unwrap();
        assert!(catalog.is_empty());
    }
}
