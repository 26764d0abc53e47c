//! Specification builder: turns resource and search handlers into one document.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::document::{
    Contact, ExternalDocs, Info, License, Scheme, Schema, SchemaType, SpecificationDocument,
    Swagger,
};
use crate::catalog::Catalog;
use crate::error::{GenerateError, HandlerError, OutputError};
use crate::handler::{
    DomainModel, EmptyDomainModel, ResourceHandler, ResourceIdentity, SearchConfig, SearchHandler,
};
use crate::index::ResourceIndex;
use crate::loader::{ensure_dir, write_atomic};
use crate::operation::{fetch_all_definition, ResourceTarget};
use crate::paths;
use crate::properties::{PropertyResolver, DEFAULT_DOMAIN_NAMESPACE};
use crate::types::FETCH_ALL_DEFINITION;

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub info: Info,
    pub host: String,
    pub base_path: String,
    pub schemes: Vec<Scheme>,
    pub external_docs: Option<ExternalDocs>,
    /// Qualified-name prefix of domain classes.
    pub domain_namespace: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            info: default_info(),
            host: "localhost:8080/openmrs".to_string(),
            base_path: "/openmrs".to_string(),
            schemes: vec![Scheme::Http, Scheme::Https],
            external_docs: Some(ExternalDocs {
                description: Some("Find more info on REST Module Wiki".to_string()),
                url: "https://wiki.openmrs.org/x/xoAaAQ".to_string(),
            }),
            domain_namespace: DEFAULT_DOMAIN_NAMESPACE.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn schemes(mut self, schemes: Vec<Scheme>) -> Self {
        self.schemes = schemes;
        self
    }

    pub fn info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    pub fn domain_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.domain_namespace = namespace.into();
        self
    }
}

fn default_info() -> Info {
    Info {
        title: "OpenMRS API Docs".to_string(),
        version: "2.4.6".to_string(),
        description: Some("OpenMRS RESTful API documentation generated by Swagger".to_string()),
        contact: Some(Contact::new("OpenMRS", "http://openmrs.org")),
        license: Some(License::new("MPL-2.0 w/ HD", "http://openmrs.org/license")),
    }
}

/// Collects handlers and builds a [`SpecificationDocument`].
///
/// ```
/// use restdoc::{GeneratorConfig, HandlerError, ResourceHandler, ResourceIdentity, SpecificationBuilder};
///
/// struct Location;
///
/// impl ResourceHandler for Location {
///     fn class_name(&self) -> &str {
///         "LocationResource1_9"
///     }
///     fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
///         Ok(ResourceIdentity::Resource {
///             name: "v1/location".into(),
///             supported_class: "org.openmrs.Location".into(),
///         })
///     }
///     fn get_by_unique_id(&self, uuid: &str) -> restdoc::HandlerResult {
///         Err(HandlerError::ObjectNotFound { id: uuid.into() })
///     }
/// }
///
/// let doc = SpecificationBuilder::new(GeneratorConfig::default())
///     .resource(&Location)
///     .build();
///
/// assert!(doc.paths.contains_key("/location/{uuid}"));
/// assert!(doc.definitions.contains_key("LocationGet"));
/// ```
pub struct SpecificationBuilder<'a> {
    config: GeneratorConfig,
    resources: Vec<&'a dyn ResourceHandler>,
    search_handlers: Vec<&'a dyn SearchHandler>,
    domain: &'a dyn DomainModel,
}

impl<'a> SpecificationBuilder<'a> {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            resources: Vec::new(),
            search_handlers: Vec::new(),
            domain: &EmptyDomainModel,
        }
    }

    pub fn resource(mut self, handler: &'a dyn ResourceHandler) -> Self {
        self.resources.push(handler);
        self
    }

    pub fn resources<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn ResourceHandler>,
    {
        self.resources.extend(handlers);
        self
    }

    pub fn search_handler(mut self, handler: &'a dyn SearchHandler) -> Self {
        self.search_handlers.push(handler);
        self
    }

    pub fn search_handlers<I>(mut self, handlers: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn SearchHandler>,
    {
        self.search_handlers.extend(handlers);
        self
    }

    pub fn domain_model(mut self, domain: &'a dyn DomainModel) -> Self {
        self.domain = domain;
        self
    }

    /// Build the document.
    ///
    /// Handlers that fail individually are logged and skipped; the build
    /// itself never fails.
    pub fn build(&self) -> SpecificationDocument {
        let config = &self.config;
        let mut doc: SpecificationDocument = Swagger::new(config.info.clone())
            .with_basic_auth()
            .with_json_media_type();
        doc.host = Some(config.host.clone());
        doc.base_path = Some(config.base_path.clone());
        doc.schemes = config.schemes.clone();
        doc.external_docs = config.external_docs.clone();

        let index = ResourceIndex::build(self.resources.iter().copied());
        let resolver = PropertyResolver::new(&index, self.domain, &config.domain_namespace);
        let search_configs = self.search_configs();

        for (handler, identity) in self.ordered_resources() {
            let identity = match identity {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(
                        handler = handler.class_name(),
                        error = %e,
                        "skipping resource without identity"
                    );
                    continue;
                }
            };
            if handler.is_delegating_subclass_handler() {
                debug!(handler = handler.class_name(), "skipping subclass handler");
                continue;
            }

            let target = ResourceTarget::new(handler, identity.resource_name(), identity.parent_name());
            for (path, item) in paths::assemble(&target, &search_configs, &resolver, &mut doc.definitions) {
                if doc.paths.contains_key(&path) {
                    warn!(path = %path, handler = handler.class_name(), "path already documented, replacing");
                }
                doc.paths.insert(path, item);
            }
        }

        doc.definitions
            .insert(FETCH_ALL_DEFINITION.to_string(), fetch_all_definition());
        repair_dangling_references(&mut doc);

        info!(
            resources = self.resources.len(),
            paths = doc.paths.len(),
            definitions = doc.definitions.len(),
            "generated specification"
        );
        doc
    }

    /// Handlers in processing order: top-level resources first, otherwise
    /// registration order.
    fn ordered_resources(&self) -> Vec<(&'a dyn ResourceHandler, Result<ResourceIdentity, HandlerError>)> {
        let mut ordered: Vec<_> = self
            .resources
            .iter()
            .map(|handler| (*handler, handler.identity()))
            .collect();
        ordered.sort_by_key(|(_, identity)| {
            identity
                .as_ref()
                .map(ResourceIdentity::is_subresource)
                .unwrap_or(false)
        });
        ordered
    }

    fn search_configs(&self) -> Vec<SearchConfig> {
        self.search_handlers
            .iter()
            .filter_map(|handler| match handler.search_config() {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(error = %e, "skipping search handler without configuration");
                    None
                }
            })
            .collect()
    }
}

/// Serialize a document as pretty-printed JSON.
pub fn to_json(doc: &SpecificationDocument) -> Result<String, OutputError> {
    serde_json::to_string_pretty(doc).map_err(|source| OutputError::Serialize { source })
}

/// File name of the document generated for `version`.
pub fn output_filename(version: &str) -> String {
    format!("openapi-{}.json", version)
}

/// Write `doc` to `<output_dir>/openapi-<version>.json`.
pub fn write_specification(
    doc: &SpecificationDocument,
    output_dir: &Path,
    version: &str,
) -> Result<PathBuf, OutputError> {
    let json = to_json(doc)?;
    let path = output_dir.join(output_filename(version));
    write_atomic(&path, &json)?;
    info!(path = %path.display(), "wrote specification");
    Ok(path)
}

/// Scan a resource catalog and write the generated document.
///
/// The output directory is created before scanning, so it exists even when
/// the catalog turns out to be empty.
pub fn generate_from_catalog<S: AsRef<str>>(
    classes_dir: &Path,
    packages: &[S],
    output_dir: &Path,
    version: &str,
    config: GeneratorConfig,
) -> Result<PathBuf, GenerateError> {
    ensure_dir(output_dir)?;
    let catalog = Catalog::scan(classes_dir, packages)?;
    let doc = SpecificationBuilder::new(config)
        .resources(catalog.resources())
        .search_handlers(catalog.search_handlers())
        .domain_model(catalog.domain())
        .build();
    Ok(write_specification(&doc, output_dir, version)?)
}

/// Replace definition properties whose `$ref` has no target with plain strings.
///
/// Returns the number of properties replaced.
pub fn repair_dangling_references(doc: &mut SpecificationDocument) -> usize {
    let known: HashSet<String> = doc.definitions.keys().cloned().collect();
    let dangles = |schema: &Schema| {
        schema
            .referenced_definition()
            .map_or(false, |name| !known.contains(name))
    };

    let mut repaired = 0;
    for (model_name, model) in doc.definitions.iter_mut() {
        for (property, schema) in model.properties.iter_mut() {
            let broken = dangles(schema)
                || (schema.schema_type == Some(SchemaType::Array)
                    && schema.items.as_deref().map_or(false, dangles));
            if broken {
                warn!(
                    definition = %model_name,
                    property = %property,
                    "reference has no definition, using string property"
                );
                *schema = Schema::string();
                repaired += 1;
            }
        }
    }
    repaired
}
