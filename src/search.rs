//! Search augmentation of a resource's collection path.
//!
//! A resource is searchable when a registered [`SearchConfig`] names it, or
//! when its handler implements the search entry point. A searchable resource
//! without a fetch-all GET gets a search-only GET; otherwise the existing GET
//! is documented as fetch-all-or-search. Either way the parameters declared by
//! the matching search configs are appended as string query parameters.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{Parameter, PathItem, Schema, SchemaType};
use crate::handler::{SearchConfig, SearchParameter};
use crate::operation::{build_operation, search_query_parameter, ResourceTarget};
use crate::probe::is_implemented;
use crate::properties::PropertyResolver;
use crate::types::{Action, OperationKind};

/// Versioned key a search config uses to name the resource.
pub fn supported_resource_key(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("v1/{}/{}", parent, name),
        None => format!("v1/{}", name),
    }
}

/// Search configs registered for a resource, in registration order.
pub fn matching_configs<'c>(
    configs: &'c [SearchConfig],
    name: &str,
    parent: Option<&str>,
) -> Vec<&'c SearchConfig> {
    let key = supported_resource_key(name, parent);
    configs
        .iter()
        .filter(|config| config.supported_resource == key)
        .collect()
}

/// Document search on the collection path of `target`.
pub fn augment(
    target: &ResourceTarget<'_>,
    collection: &mut PathItem,
    configs: &[SearchConfig],
    resolver: &PropertyResolver<'_>,
    definitions: &mut IndexMap<String, Schema>,
) {
    let matched = matching_configs(configs, target.name, target.parent);
    let has_search_handler = !matched.is_empty();
    let has_search = is_implemented(target.handler, Action::Search);
    if !has_search_handler && !has_search {
        return;
    }

    match collection.get.as_mut() {
        Some(existing) => {
            existing.summary = Some(format!(
                "Fetch all non-retired {} resources or perform search",
                target.name
            ));
            existing.description = Some("All search parameters are optional".into());
            existing.parameter(search_query_parameter());
        }
        None => {
            let kind = OperationKind::new(Action::Search, target.is_subresource());
            let mut op = build_operation(target, kind, resolver, definitions);
            if !has_search_handler {
                // q is then the only way to search
                if let Some(q) = op.parameters.iter_mut().find(|p| p.name == "q") {
                    q.required = true;
                }
            }
            collection.get = Some(op);
        }
    }
    let Some(operation) = collection.get.as_mut() else {
        return;
    };

    let mut parameters: BTreeMap<String, Parameter> = BTreeMap::new();
    for config in &matched {
        for query in &config.search_queries {
            for required in &query.required_parameters {
                parameters.insert(
                    required.name.clone(),
                    Parameter::query(required.name.clone(), SchemaType::String),
                );
            }
            let dependency = dependency_description(&query.required_parameters);
            for optional in &query.optional_parameters {
                let mut param = Parameter::query(optional.name.clone(), SchemaType::String);
                param.description = dependency.clone();
                parameters.insert(optional.name.clone(), param);
            }
        }
    }

    debug!(
        resource = target.name,
        search_handlers = matched.len(),
        parameters = parameters.len(),
        "documented search"
    );
    for (name, param) in parameters {
        if operation.find_parameter(&name).is_some() {
            debug!(resource = target.name, parameter = %name, "search parameter already present");
            continue;
        }
        operation.parameter(param);
    }
    operation.operation_id = Some(target.fetch_all_operation_id());
}

/// `Must be used with a, b and c`, or nothing when there are no dependencies.
fn dependency_description(required: &[SearchParameter]) -> Option<String> {
    let names: Vec<&str> = required.iter().map(|p| p.name.as_str()).collect();
    match names.split_last() {
        None => None,
        Some((last, [])) => Some(format!("Must be used with {}", last)),
        Some((last, init)) => Some(format!("Must be used with {} and {}", init.join(", "), last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Operation;
    use crate::error::HandlerError;
    use crate::handler::{
        EmptyDomainModel, HandlerResult, RequestContext, ResourceHandler, ResourceIdentity,
        SearchQuery,
    };
    use crate::index::ResourceIndex;
    use crate::properties::DEFAULT_DOMAIN_NAMESPACE;
    use serde_json::Value;

    struct Person {
        searchable: bool,
    }

    impl ResourceHandler for Person {
        fn class_name(&self) -> &str {
            "PersonResource1_8"
        }
        fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
            Ok(ResourceIdentity::Resource {
                name: "v1/person".into(),
                supported_class: "org.openmrs.Person".into(),
            })
        }
        fn search(&self, _context: &RequestContext) -> HandlerResult {
            if self.searchable {
                Ok(Value::Null)
            } else {
                Err(HandlerError::unsupported("search"))
            }
        }
    }

    fn config(resource: &str, required: &[&str], optional: &[&str]) -> SearchConfig {
        SearchConfig {
            id: None,
            supported_resource: resource.into(),
            search_queries: vec![SearchQuery {
                description: None,
                required_parameters: required.iter().map(|n| SearchParameter::new(*n)).collect(),
                optional_parameters: optional.iter().map(|n| SearchParameter::new(*n)).collect(),
            }],
        }
    }

    fn run(handler: &Person, collection: &mut PathItem, configs: &[SearchConfig]) {
        let index = ResourceIndex::default();
        let resolver = PropertyResolver::new(&index, &EmptyDomainModel, DEFAULT_DOMAIN_NAMESPACE);
        let target = ResourceTarget::new(handler, "person", None);
        let mut definitions = IndexMap::new();
        augment(&target, collection, configs, &resolver, &mut definitions);
    }

    fn names(op: &Operation) -> Vec<&str> {
        op.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn keys_include_parent() {
        assert_eq!(supported_resource_key("name", Some("concept")), "v1/concept/name");
        assert_eq!(supported_resource_key("person", None), "v1/person");

        let configs = [config("v1/person", &[], &[]), config("v1/patient", &[], &[])];
        assert_eq!(matching_configs(&configs, "person", None).len(), 1);
        assert!(matching_configs(&configs, "person", Some("patient")).is_empty());
    }

    #[test]
    fn not_searchable_leaves_path_alone() {
        let mut collection = PathItem::default();
        run(&Person { searchable: false }, &mut collection, &[]);
        assert!(collection.is_empty());
    }

    #[test]
    fn search_only_operation_requires_q_without_search_handler() {
        let mut collection = PathItem::default();
        run(&Person { searchable: true }, &mut collection, &[]);

        let op = collection.get.unwrap();
        assert_eq!(op.summary.as_deref(), Some("Search for person"));
        assert_eq!(
            op.description.as_deref(),
            Some("At least one search parameter must be specified")
        );
        assert_eq!(names(&op), ["limit", "startIndex", "v", "q"]);
        assert!(op.find_parameter("q").unwrap().required);
        assert!(op.consumes.is_empty());
        assert_eq!(op.produces, ["application/json", "application/xml"]);
        assert_eq!(op.operation_id.as_deref(), Some("getAllPeople"));
        assert_eq!(
            op.responses["200"].schema.as_ref().unwrap().referenced_definition(),
            Some("FetchAll")
        );
    }

    #[test]
    fn search_handler_parameters_are_appended() {
        let mut collection = PathItem::default();
        let configs = [config("v1/person", &["name"], &["gender", "birthdate"])];
        run(&Person { searchable: false }, &mut collection, &configs);

        let op = collection.get.unwrap();
        assert!(!op.find_parameter("q").unwrap().required);
        assert_eq!(
            names(&op),
            ["limit", "startIndex", "v", "q", "birthdate", "gender", "name"]
        );
        assert_eq!(
            op.find_parameter("gender").unwrap().description.as_deref(),
            Some("Must be used with name")
        );
        assert_eq!(op.find_parameter("name").unwrap().description, None);
    }

    #[test]
    fn existing_fetch_all_is_augmented() {
        let mut existing = Operation::default();
        existing.operation_id = Some("stale".into());
        let mut collection = PathItem {
            get: Some(existing),
            ..PathItem::default()
        };
        let configs = [
            config("v1/person", &["a"], &[]),
            config("v1/person", &["a", "b", "c"], &["d"]),
        ];
        run(&Person { searchable: false }, &mut collection, &configs);

        let op = collection.get.unwrap();
        assert_eq!(
            op.summary.as_deref(),
            Some("Fetch all non-retired person resources or perform search")
        );
        assert_eq!(op.description.as_deref(), Some("All search parameters are optional"));
        assert_eq!(names(&op), ["q", "a", "b", "c", "d"]);
        assert_eq!(
            op.find_parameter("d").unwrap().description.as_deref(),
            Some("Must be used with a, b and c")
        );
        assert_eq!(op.operation_id.as_deref(), Some("getAllPeople"));
    }

    #[test]
    fn built_in_parameters_are_not_repeated() {
        let mut collection = PathItem::default();
        let configs = [config("v1/person", &["q"], &["v", "limit", "gender"])];
        run(&Person { searchable: true }, &mut collection, &configs);

        let op = collection.get.unwrap();
        assert_eq!(names(&op), ["limit", "startIndex", "v", "q", "gender"]);
        assert_eq!(op.find_parameter("v").unwrap().enum_values.len(), 4);
    }
}
