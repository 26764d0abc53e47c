//! Aggregation of several generated documents into one.
//!
//! # Merge policy
//!
//! | Section | Rule |
//! |---------|------|
//! | `paths` | last document wins per template, conflict warned |
//! | `definitions` | last document wins per name, conflict warned |
//! | `securityDefinitions` | taken whole from the first document that has any |
//! | `info`, `host`, `basePath`, `schemes` | from [`AggregatorConfig`] |
//!
//! Sources are processed in the order given; [`aggregate_directory`] reads a
//! directory in file-name order.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::document::{
    AggregatedDocument, Contact, Info, License, Scheme, SecurityScheme, Swagger,
};
use crate::error::{AggregateError, OutputError, SchemaError};
use crate::loader::{collect_json_files, load_document, load_document_auto, write_atomic};
use crate::validator::check_structure;

/// Settings for an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Base URL of the aggregated API; split into host and base path.
    pub base_url: String,
    pub api_version: String,
    pub title: String,
    pub description: String,
    /// Run the pre-merge checks.
    pub validate: bool,
    pub output_filename: String,
    /// Extra documents fetched after the directory's, by URL or path.
    pub spec_urls: Vec<String>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/openmrs".to_string(),
            api_version: "1.0.0".to_string(),
            title: "OpenMRS REST API (Aggregated)".to_string(),
            description: "Aggregated OpenMRS REST API specification".to_string(),
            validate: true,
            output_filename: "openapi-aggregated.json".to_string(),
            spec_urls: Vec::new(),
        }
    }
}

impl AggregatorConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn output_filename(mut self, filename: impl Into<String>) -> Self {
        self.output_filename = filename.into();
        self
    }

    pub fn spec_url(mut self, url: impl Into<String>) -> Self {
        self.spec_urls.push(url.into());
        self
    }

    fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            version: self.api_version.clone(),
            description: Some(self.description.clone()),
            contact: Some(Contact::new("OpenMRS", "https://openmrs.org")),
            license: Some(License::new(
                "MPL 2.0",
                "https://www.mozilla.org/en-US/MPL/2.0/",
            )),
        }
    }
}

/// Host part of a base URL: the URL minus a leading `http://` or `https://`.
pub fn extract_host(base_url: &str) -> &str {
    base_url
        .strip_prefix("http://")
        .or_else(|| base_url.strip_prefix("https://"))
        .unwrap_or(base_url)
}

/// `/openmrs` if the URL mentions it anywhere, otherwise empty.
pub fn extract_base_path(base_url: &str) -> &'static str {
    if base_url.contains("/openmrs") {
        "/openmrs"
    } else {
        ""
    }
}

/// One input document and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub origin: String,
    pub document: Value,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, document: Value) -> Self {
        Self {
            origin: origin.into(),
            document,
        }
    }
}

/// Non-fatal findings of an aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateWarning {
    /// The source, or one of its merged sections, could not be read and was skipped.
    Unreadable { origin: String, message: String },
    /// The source failed a structural check.
    Structure { origin: String, error: SchemaError },
    NoPaths { origin: String },
    NoDefinitions { origin: String },
    /// A later source replaced an earlier source's path.
    PathConflict { path: String, origin: String },
    /// A later source replaced an earlier source's definition.
    DefinitionConflict { name: String, origin: String },
}

impl fmt::Display for AggregateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateWarning::Unreadable { origin, message } => {
                write!(f, "skipping {}: {}", origin, message)
            }
            AggregateWarning::Structure { origin, error } => write!(f, "{}: {}", origin, error),
            AggregateWarning::NoPaths { origin } => write!(f, "{} has no paths", origin),
            AggregateWarning::NoDefinitions { origin } => {
                write!(f, "{} has no definitions", origin)
            }
            AggregateWarning::PathConflict { path, origin } => {
                write!(f, "path conflict on {}, using the one from {}", path, origin)
            }
            AggregateWarning::DefinitionConflict { name, origin } => write!(
                f,
                "definition conflict on {}, using the one from {}",
                name, origin
            ),
        }
    }
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub document: AggregatedDocument,
    pub warnings: Vec<AggregateWarning>,
}

/// Merge `sources` in order.
///
/// ```
/// use restdoc::{aggregate, AggregatorConfig, SourceDocument};
/// use serde_json::json;
///
/// let a = SourceDocument::new("a.json", json!({"swagger": "2.0", "paths": {"/x": {"get": {}}}}));
/// let b = SourceDocument::new("b.json", json!({"swagger": "2.0", "paths": {"/x": {"post": {}}}}));
///
/// let merged = aggregate(&[a, b], &AggregatorConfig::default().validate(false));
/// assert!(merged.document.paths["/x"].get("post").is_some());
/// assert_eq!(merged.warnings.len(), 1);
/// ```
pub fn aggregate(sources: &[SourceDocument], config: &AggregatorConfig) -> Aggregation {
    let mut warnings = Vec::new();
    let mut document: AggregatedDocument = Swagger::new(config.info());
    document.host = Some(extract_host(&config.base_url).to_string());
    document.base_path = Some(extract_base_path(&config.base_url).to_string());
    document.schemes = vec![Scheme::Http, Scheme::Https];

    for source in sources {
        if config.validate {
            check_source(source, &mut warnings);
        }

        // Only the merged sections are read; the envelope comes from config.
        let Some(root) = source.document.as_object() else {
            warnings.push(AggregateWarning::Unreadable {
                origin: source.origin.clone(),
                message: "document is not a JSON object".to_string(),
            });
            continue;
        };
        let section = |key: &str| root.get(key).and_then(Value::as_object);

        for (path, item) in section("paths").into_iter().flatten() {
            if document.paths.contains_key(path) {
                warnings.push(AggregateWarning::PathConflict {
                    path: path.clone(),
                    origin: source.origin.clone(),
                });
            }
            document.paths.insert(path.clone(), item.clone());
        }

        for (name, model) in section("definitions").into_iter().flatten() {
            if document.definitions.contains_key(name) {
                warnings.push(AggregateWarning::DefinitionConflict {
                    name: name.clone(),
                    origin: source.origin.clone(),
                });
            }
            document.definitions.insert(name.clone(), model.clone());
        }

        if document.security_definitions.is_empty() {
            if let Some(schemes) = section("securityDefinitions").filter(|s| !s.is_empty()) {
                let parsed = serde_json::from_value::<IndexMap<String, SecurityScheme>>(
                    Value::Object(schemes.clone()),
                );
                match parsed {
                    Ok(parsed) => document.security_definitions = parsed,
                    Err(e) => warnings.push(AggregateWarning::Unreadable {
                        origin: source.origin.clone(),
                        message: format!("securityDefinitions: {}", e),
                    }),
                }
            }
        }
    }

    for warning in &warnings {
        warn!("{}", warning);
    }
    Aggregation { document, warnings }
}

fn check_source(source: &SourceDocument, warnings: &mut Vec<AggregateWarning>) {
    let origin = || source.origin.clone();
    for error in check_structure(&source.document) {
        warnings.push(AggregateWarning::Structure {
            origin: origin(),
            error,
        });
    }

    let is_empty = |key: &str| {
        source
            .document
            .get(key)
            .and_then(Value::as_object)
            .map_or(true, |map| map.is_empty())
    };
    if is_empty("paths") {
        warnings.push(AggregateWarning::NoPaths { origin: origin() });
    }
    if is_empty("definitions") {
        warnings.push(AggregateWarning::NoDefinitions { origin: origin() });
    }
}

/// Read every `*.json` file of `dir` in file-name order.
///
/// Unreadable files are skipped and reported in the returned warnings.
pub fn load_sources(
    dir: &Path,
) -> Result<(Vec<SourceDocument>, Vec<AggregateWarning>), AggregateError> {
    let files = collect_json_files(dir, false).map_err(|source| AggregateError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut sources = Vec::new();
    let mut warnings = Vec::new();
    for file in files {
        let origin = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        match load_document::<Value>(&file) {
            Ok(document) => {
                debug!(file = %origin, "loaded specification");
                sources.push(SourceDocument::new(origin, document));
            }
            Err(e) => warnings.push(AggregateWarning::Unreadable {
                origin,
                message: e.to_string(),
            }),
        }
    }
    Ok((sources, warnings))
}

/// Aggregate the documents of `input_dir` (plus any configured URLs) into
/// `<output_dir>/<output_filename>`.
///
/// Returns the written path, or `None` when there was nothing to aggregate:
/// a missing input directory or no readable documents.
pub fn aggregate_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &AggregatorConfig,
) -> Result<Option<PathBuf>, AggregateError> {
    if !input_dir.is_dir() {
        warn!(path = %input_dir.display(), "input directory does not exist");
        return Ok(None);
    }
    crate::loader::ensure_dir(output_dir)?;

    let (mut sources, load_warnings) = load_sources(input_dir)?;
    for warning in &load_warnings {
        warn!("{}", warning);
    }
    for url in &config.spec_urls {
        match load_document_auto::<Value>(url) {
            Ok(document) => sources.push(SourceDocument::new(url.clone(), document)),
            Err(e) => warn!(source = %url, error = %e, "skipping specification"),
        }
    }

    info!(count = sources.len(), "found specifications");
    if sources.is_empty() {
        warn!("no specifications found to aggregate");
        return Ok(None);
    }

    let aggregation = aggregate(&sources, config);
    let json = serde_json::to_string_pretty(&aggregation.document)
        .map_err(|source| OutputError::Serialize { source })?;
    let output_path = output_dir.join(&config.output_filename);
    write_atomic(&output_path, &json)?;

    info!(
        path = %output_path.display(),
        paths = aggregation.document.paths.len(),
        definitions = aggregation.document.definitions.len(),
        "wrote aggregated specification"
    );
    Ok(Some(output_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(paths: Value, definitions: Value) -> Value {
        json!({ "swagger": "2.0", "paths": paths, "definitions": definitions })
    }

    #[test]
    fn host_and_base_path_from_url() {
        assert_eq!(extract_host("http://localhost:8080/openmrs"), "localhost:8080/openmrs");
        assert_eq!(extract_host("https://demo.example.org"), "demo.example.org");
        assert_eq!(extract_host("demo.example.org"), "demo.example.org");
        assert_eq!(extract_base_path("http://localhost:8080/openmrs"), "/openmrs");
        assert_eq!(extract_base_path("https://demo.example.org/api"), "");
    }

    #[test]
    fn envelope_comes_from_config() {
        let source = SourceDocument::new(
            "a.json",
            json!({"swagger": "2.0", "host": "elsewhere", "info": {"title": "module", "version": "9"}}),
        );
        let config = AggregatorConfig::default().api_version("2.0.0").title("All");
        let merged = aggregate(&[source], &config).document;

        assert_eq!(merged.host.as_deref(), Some("localhost:8080/openmrs"));
        assert_eq!(merged.base_path.as_deref(), Some("/openmrs"));
        assert_eq!(merged.schemes, [Scheme::Http, Scheme::Https]);
        assert_eq!(merged.info.title, "All");
        assert_eq!(merged.info.version, "2.0.0");
        assert_eq!(merged.info.license.unwrap().name, "MPL 2.0");
    }

    #[test]
    fn validation_warns_on_empty_sections() {
        let source = SourceDocument::new("empty.json", json!({"swagger": "2.0"}));
        let warnings = aggregate(&[source.clone()], &AggregatorConfig::default()).warnings;
        assert_eq!(
            warnings,
            [
                AggregateWarning::NoPaths {
                    origin: "empty.json".into()
                },
                AggregateWarning::NoDefinitions {
                    origin: "empty.json".into()
                },
            ]
        );

        let quiet = aggregate(&[source], &AggregatorConfig::default().validate(false));
        assert!(quiet.warnings.is_empty());
    }

    #[test]
    fn validation_flags_wrong_version() {
        let source = SourceDocument::new(
            "v3.json",
            json!({"swagger": "3.0", "paths": {"/x": {}}, "definitions": {"X": {}}}),
        );
        let warnings = aggregate(&[source], &AggregatorConfig::default()).warnings;
        assert!(matches!(
            &warnings[..],
            [AggregateWarning::Structure { origin, .. }] if origin == "v3.json"
        ));
    }

    #[test]
    fn definitions_last_writer_wins() {
        let a = SourceDocument::new("a.json", doc(json!({}), json!({"Concept": {"type": "object"}})));
        let b = SourceDocument::new("b.json", doc(json!({}), json!({"Concept": {"type": "string"}})));
        let merged = aggregate(&[a, b], &AggregatorConfig::default().validate(false));

        assert_eq!(merged.document.definitions["Concept"]["type"], "string");
        assert_eq!(
            merged.warnings,
            [AggregateWarning::DefinitionConflict {
                name: "Concept".into(),
                origin: "b.json".into()
            }]
        );
    }

    #[test]
    fn first_security_definitions_win() {
        let a = SourceDocument::new("a.json", json!({"swagger": "2.0"}));
        let b = SourceDocument::new(
            "b.json",
            json!({"swagger": "2.0", "securityDefinitions": {"basic_auth": {"type": "basic"}}}),
        );
        let c = SourceDocument::new(
            "c.json",
            json!({"swagger": "2.0", "securityDefinitions": {"token": {"type": "apiKey", "name": "t", "in": "header"}}}),
        );
        let merged = aggregate(&[a, b, c], &AggregatorConfig::default().validate(false)).document;

        assert_eq!(merged.security_definitions.len(), 1);
        assert_eq!(merged.security_definitions["basic_auth"].kind, "basic");
    }

    #[test]
    fn non_object_document_is_skipped() {
        let bad = SourceDocument::new("bad.json", json!(["swagger", "2.0"]));
        let good = SourceDocument::new("good.json", doc(json!({"/x": {"get": {}}}), json!({})));
        let merged = aggregate(&[bad, good], &AggregatorConfig::default().validate(false));

        assert_eq!(merged.document.paths.len(), 1);
        assert!(matches!(
            &merged.warnings[..],
            [AggregateWarning::Unreadable { origin, .. }] if origin == "bad.json"
        ));
    }

    #[test]
    fn non_object_section_is_ignored() {
        let source = SourceDocument::new(
            "odd.json",
            json!({"swagger": "2.0", "paths": [], "definitions": {"X": {}}}),
        );
        let merged = aggregate(&[source], &AggregatorConfig::default().validate(false));

        assert!(merged.document.paths.is_empty());
        assert!(merged.document.definitions.contains_key("X"));
        assert!(merged.warnings.is_empty());
    }

    #[test]
    fn warning_display() {
        let warning = AggregateWarning::PathConflict {
            path: "/concept".into(),
            origin: "b.json".into(),
        };
        assert_eq!(
            warning.to_string(),
            "path conflict on /concept, using the one from b.json"
        );
    }
}
