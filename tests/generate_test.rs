//! Integration tests for document generation.

use indexmap::IndexMap;
use restdoc::{
    Action, DomainModel, FieldType, GeneratorConfig, GenericType, HandlerError, HandlerResult,
    RequestContext, ResourceDescription, ResourceHandler, ResourceIdentity, SearchConfig,
    SearchParameter, SearchQuery, SimpleObject, SpecificationBuilder, SpecificationDocument,
    TypeArgument, TypeLevel,
};
use serde_json::Value;

/// Handler implementing a fixed set of entry points.
struct Stub {
    class_name: &'static str,
    identity: ResourceIdentity,
    actions: Vec<Action>,
    properties: Vec<&'static str>,
}

impl Stub {
    fn resource(class_name: &'static str, name: &str, supported_class: &str, actions: &[Action]) -> Self {
        Self {
            class_name,
            identity: ResourceIdentity::Resource {
                name: name.into(),
                supported_class: supported_class.into(),
            },
            actions: actions.to_vec(),
            properties: Vec::new(),
        }
    }

    fn subresource(
        class_name: &'static str,
        parent: &str,
        path: &str,
        supported_class: &str,
        actions: &[Action],
    ) -> Self {
        Self {
            class_name,
            identity: ResourceIdentity::SubResource {
                parent_name: parent.into(),
                path: path.into(),
                supported_class: supported_class.into(),
            },
            actions: actions.to_vec(),
            properties: Vec::new(),
        }
    }

    fn properties(mut self, properties: &[&'static str]) -> Self {
        self.properties = properties.to_vec();
        self
    }

    fn answer(&self, action: Action) -> HandlerResult {
        if self.actions.contains(&action) {
            Ok(Value::Null)
        } else {
            Err(HandlerError::unsupported(action.entry_point()))
        }
    }

    fn description(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        Ok(Some(ResourceDescription::new(self.properties.iter().copied())))
    }
}

impl ResourceHandler for Stub {
    fn class_name(&self) -> &str {
        self.class_name
    }

    fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
        Ok(self.identity.clone())
    }

    fn type_hierarchy(&self) -> Vec<TypeLevel> {
        vec![TypeLevel {
            interfaces: Vec::new(),
            superclass: Some(GenericType {
                name: "DelegatingCrudResource".into(),
                type_arguments: vec![TypeArgument::Class(
                    self.identity.supported_class().to_string(),
                )],
            }),
        }]
    }

    fn get_all(&self, _: &RequestContext) -> HandlerResult {
        self.answer(Action::FetchAll)
    }

    fn get_by_unique_id(&self, _: &str) -> HandlerResult {
        self.answer(Action::FetchById)
    }

    fn search(&self, _: &RequestContext) -> HandlerResult {
        self.answer(Action::Search)
    }

    fn create(&self, _: &SimpleObject, _: &RequestContext) -> HandlerResult {
        self.answer(Action::Create)
    }

    fn update(&self, _: &str, _: &SimpleObject, _: &RequestContext) -> HandlerResult {
        self.answer(Action::Update)
    }

    fn delete(&self, _: &str, _: &str, _: &RequestContext) -> HandlerResult {
        self.answer(Action::Delete)
    }

    fn purge(&self, _: &str, _: &RequestContext) -> HandlerResult {
        self.answer(Action::Purge)
    }

    fn representation_description(
        &self,
        _: restdoc::Representation,
    ) -> Result<Option<ResourceDescription>, HandlerError> {
        self.description()
    }

    fn creatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        self.description()
    }

    fn updatable_properties(&self) -> Result<Option<ResourceDescription>, HandlerError> {
        self.description()
    }
}

/// Domain model backed by a field table.
#[derive(Default)]
struct Fields(IndexMap<(&'static str, &'static str), FieldType>);

impl Fields {
    fn with(mut self, class: &'static str, field: &'static str, field_type: FieldType) -> Self {
        self.0.insert((class, field), field_type);
        self
    }
}

impl DomainModel for Fields {
    fn field_type(&self, class: &str, field: &str) -> Option<FieldType> {
        self.0
            .iter()
            .find(|((c, f), _)| *c == class && *f == field)
            .map(|(_, t)| t.clone())
    }

    fn enum_constants(&self, _class: &str) -> Option<Vec<String>> {
        None
    }
}

const ALL: &[Action] = &[
    Action::FetchAll,
    Action::FetchById,
    Action::Search,
    Action::Create,
    Action::Update,
    Action::Delete,
    Action::Purge,
];

fn build(handlers: &[&dyn ResourceHandler]) -> SpecificationDocument {
    SpecificationBuilder::new(GeneratorConfig::default())
        .resources(handlers.iter().copied())
        .build()
}

fn verbs(doc: &SpecificationDocument, path: &str) -> Vec<&'static str> {
    doc.paths[path].operations().map(|(verb, _)| verb).collect()
}

mod paths {
    use super::*;

    #[test]
    fn resource_without_operations_has_no_paths() {
        let idle = Stub::resource("IdleResource", "v1/idle", "org.openmrs.Idle", &[]);
        let concept = Stub::resource("ConceptResource1_8", "v1/concept", "org.openmrs.Concept", &[Action::FetchAll]);
        let doc = build(&[&idle, &concept]);

        assert!(doc.paths.keys().all(|path| !path.contains("idle")));
        assert!(doc.definitions.keys().all(|name| !name.starts_with("Idle")));
    }

    #[test]
    fn fetch_by_id_references_get_model() {
        let location = Stub::resource("LocationResource1_9", "v1/location", "org.openmrs.Location", &[Action::FetchById]);
        let doc = build(&[&location]);

        let get = doc.paths["/location/{uuid}"].get.as_ref().unwrap();
        let schema = get.responses["200"].schema.as_ref().unwrap();
        assert_eq!(schema.referenced_definition(), Some("LocationGet"));
        assert!(!doc.paths.contains_key("/location"));
    }

    #[test]
    fn delete_and_purge_share_one_operation() {
        let encounter = Stub::resource(
            "EncounterResource1_8",
            "v1/encounter",
            "org.openmrs.Encounter",
            &[Action::Delete, Action::Purge],
        );
        let doc = build(&[&encounter]);

        assert_eq!(verbs(&doc, "/encounter/{uuid}"), ["delete"]);
        let delete = doc.paths["/encounter/{uuid}"].delete.as_ref().unwrap();
        let purge = delete.find_parameter("purge").unwrap();
        assert!(!purge.required);
        assert_eq!(delete.parameters.iter().filter(|p| p.name == "purge").count(), 1);
    }

    #[test]
    fn subresource_paths_nest_under_parent() {
        let concept = Stub::resource("ConceptResource1_8", "v1/concept", "org.openmrs.Concept", &[Action::FetchAll]);
        let name = Stub::subresource(
            "ConceptNameResource1_9",
            "v1/concept",
            "name",
            "org.openmrs.ConceptName",
            ALL,
        );
        let doc = build(&[&name, &concept]);

        let nested: Vec<_> = doc.paths.keys().filter(|p| p.contains("name")).collect();
        assert_eq!(nested, ["/concept/{parent-uuid}/name", "/concept/{parent-uuid}/name/{uuid}"]);
        assert!(!doc.paths.contains_key("/name"));
        assert!(doc.definitions.contains_key("ConceptNameGet"));
    }

    #[test]
    fn top_level_resources_are_processed_first() {
        let concept = Stub::resource("ConceptResource1_8", "v1/concept", "org.openmrs.Concept", &[Action::FetchAll]);
        let name = Stub::subresource(
            "ConceptNameResource1_9",
            "v1/concept",
            "name",
            "org.openmrs.ConceptName",
            &[Action::FetchAll],
        );
        let doc = build(&[&name, &concept]);

        assert_eq!(
            doc.paths.keys().collect::<Vec<_>>(),
            ["/concept", "/concept/{parent-uuid}/name"]
        );
    }
}

mod references {
    use super::*;

    #[test]
    fn every_reference_resolves() {
        let patient = Stub::resource("PatientResource1_8", "v1/patient", "org.openmrs.Patient", &[Action::FetchById]);
        let encounter = Stub::resource("EncounterResource1_8", "v1/encounter", "org.openmrs.Encounter", ALL)
            .properties(&["patient", "location", "obs"]);
        let fields = Fields::default()
            .with("org.openmrs.Encounter", "patient", FieldType::Class { name: "org.openmrs.Patient".into() })
            .with("org.openmrs.Encounter", "location", FieldType::Class { name: "org.openmrs.Location".into() })
            .with(
                "org.openmrs.Encounter",
                "obs",
                FieldType::Collection {
                    element: Some("org.openmrs.Obs".into()),
                },
            );

        let doc = SpecificationBuilder::new(GeneratorConfig::default())
            .resource(&encounter)
            .resource(&patient)
            .domain_model(&fields)
            .build();

        assert!(doc.dangling_references().is_empty(), "{:?}", doc.dangling_references());
        assert_eq!(
            doc.definitions["EncounterGet"].properties["patient"].referenced_definition(),
            Some("PatientGet")
        );
        assert_eq!(
            doc.definitions["EncounterGetFull"].properties["patient"].referenced_definition(),
            Some("PatientGetFull")
        );
        // Patient exposes no create operation, so there is no PatientCreate model.
        assert_eq!(
            doc.definitions["EncounterCreate"].properties["patient"],
            restdoc::Schema::string()
        );
    }

    #[test]
    fn search_configs_do_not_break_references() {
        let person = Stub::resource("PersonResource1_8", "v1/person", "org.openmrs.Person", &[Action::Search]);
        let config = SearchConfig {
            id: Some("default".into()),
            supported_resource: "v1/person".into(),
            search_queries: vec![SearchQuery {
                description: None,
                required_parameters: vec![SearchParameter::new("name")],
                optional_parameters: vec![SearchParameter::new("gender")],
            }],
        };

        let doc = SpecificationBuilder::new(GeneratorConfig::default())
            .resource(&person)
            .search_handler(&config)
            .build();

        let get = doc.paths["/person"].get.as_ref().unwrap();
        assert_eq!(get.operation_id.as_deref(), Some("getAllPeople"));
        assert!(get.find_parameter("name").is_some());
        assert!(get.find_parameter("gender").is_some());
        assert!(doc.dangling_references().is_empty());
    }
}

mod scenarios {
    use super::*;

    #[test]
    fn concept_with_fetch_operations_only() {
        let concept = Stub::resource(
            "ConceptResource1_8",
            "v1/concept",
            "org.openmrs.Concept",
            &[Action::FetchAll, Action::FetchById],
        );
        let doc = build(&[&concept]);

        assert_eq!(
            doc.paths.keys().collect::<Vec<_>>(),
            ["/concept", "/concept/{uuid}"]
        );
        assert_eq!(verbs(&doc, "/concept"), ["get"]);
        assert_eq!(verbs(&doc, "/concept/{uuid}"), ["get"]);

        let by_id = doc.paths["/concept/{uuid}"].get.as_ref().unwrap();
        assert!(by_id.responses.contains_key("404"));

        for name in ["ConceptGet", "ConceptGetRef", "ConceptGetFull", "FetchAll"] {
            assert!(doc.definitions.contains_key(name), "missing {}", name);
        }
        assert!(!doc.definitions.contains_key("ConceptCreate"));
        assert!(!doc.definitions.contains_key("ConceptUpdate"));
    }

    #[test]
    fn failing_entry_point_is_assumed_implemented() {
        struct Flaky;

        impl ResourceHandler for Flaky {
            fn class_name(&self) -> &str {
                "ProviderResource1_9"
            }
            fn identity(&self) -> Result<ResourceIdentity, HandlerError> {
                Ok(ResourceIdentity::Resource {
                    name: "v1/provider".into(),
                    supported_class: "org.openmrs.Provider".into(),
                })
            }
            fn get_by_unique_id(&self, uuid: &str) -> HandlerResult {
                Err(HandlerError::ObjectNotFound { id: uuid.into() })
            }
        }

        let doc = build(&[&Flaky]);
        assert_eq!(doc.paths.keys().collect::<Vec<_>>(), ["/provider/{uuid}"]);
    }
}
