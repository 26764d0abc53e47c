//! Operation templates and the definitions they reference.

use indexmap::IndexMap;

use crate::document::{Operation, Parameter, Response, Schema, SchemaType};
use crate::handler::ResourceHandler;
use crate::naming::operation_title;
use crate::properties::PropertyResolver;
use crate::types::{
    model_title, OperationKind, Representation, SchemaContext, SchemaFamily, JSON_MEDIA_TYPE,
    REPRESENTATION_VALUES, XML_MEDIA_TYPE,
};

/// A resource being documented: its handler plus its resolved names.
#[derive(Clone, Copy)]
pub struct ResourceTarget<'a> {
    pub handler: &'a dyn ResourceHandler,
    /// Resource name without version prefix; the path for sub-resources.
    pub name: &'a str,
    /// Parent resource name for sub-resources.
    pub parent: Option<&'a str>,
}

impl<'a> ResourceTarget<'a> {
    pub fn new(handler: &'a dyn ResourceHandler, name: &'a str, parent: Option<&'a str>) -> Self {
        Self {
            handler,
            name,
            parent,
        }
    }

    pub fn is_subresource(&self) -> bool {
        self.parent.is_some()
    }

    /// Tag grouping the resource's operations.
    pub fn tag(&self) -> &'a str {
        self.parent.unwrap_or(self.name)
    }

    /// Definition title, e.g. `ConceptName`.
    pub fn title(&self) -> String {
        model_title(self.name, self.parent)
    }

    pub fn definition(&self, context: SchemaContext) -> String {
        format!("{}{}", self.title(), context.suffix())
    }

    /// `getAll<Plural>` operation id shared by fetch-all and search.
    pub fn fetch_all_operation_id(&self) -> String {
        format!("getAll{}", operation_title(self.handler.class_name(), true))
    }

    fn operation_id(&self, verb: &str) -> String {
        format!("{}{}", verb, operation_title(self.handler.class_name(), false))
    }
}

/// Build the operation for `kind`, adding the definitions it references.
pub fn build_operation(
    target: &ResourceTarget<'_>,
    kind: OperationKind,
    resolver: &PropertyResolver<'_>,
    definitions: &mut IndexMap<String, Schema>,
) -> Operation {
    if let Some(family) = kind.schema_family() {
        create_definitions(target, family, resolver, definitions);
    }

    let mut op = Operation::default()
        .tag(target.tag())
        .consumes(JSON_MEDIA_TYPE)
        .produces(JSON_MEDIA_TYPE);

    let name = target.name;
    let get_ref = || Schema::reference(&target.definition(SchemaContext::Get));

    match kind {
        OperationKind::FetchAll => {
            op.summary = Some("Fetch all non-retired".into());
            op.operation_id = Some(target.fetch_all_operation_id());
            for param in paging_parameters() {
                op.parameter(param);
            }
            op.parameter(representation_parameter());
            add_type_parameter(target, &mut op);
            op.response(200, ok(name).with_schema(Schema::array(Some(get_ref()))));
        }
        OperationKind::FetchAllSubresource => {
            op.summary = Some(format!("Fetch all non-retired {} subresources", name));
            op.operation_id = Some(target.fetch_all_operation_id());
            for param in paging_parameters() {
                op.parameter(param);
            }
            op.parameter(parent_uuid_parameter());
            op.parameter(representation_parameter());
            add_type_parameter(target, &mut op);
            let results = Schema::object().property("results", Schema::array(Some(get_ref())));
            op.response(200, ok(name).with_schema(results));
        }
        OperationKind::FetchById => {
            op.summary = Some("Fetch by uuid".into());
            op.operation_id = Some(target.operation_id("get"));
            op.parameter(representation_parameter());
            op.parameter(Parameter::path("uuid", "uuid to filter by"));
            add_type_parameter(target, &mut op);
            op.response(200, ok(name).with_schema(get_ref()));
            op.response(404, not_found());
        }
        OperationKind::FetchByIdSubresource => {
            op.summary = Some(format!("Fetch {} subresources by uuid", name));
            op.operation_id = Some(target.operation_id("get"));
            op.parameter(parent_uuid_parameter());
            op.parameter(Parameter::path("uuid", "uuid to filter by"));
            op.parameter(representation_parameter());
            add_type_parameter(target, &mut op);
            op.response(200, ok(name).with_schema(get_ref()));
            op.response(404, not_found());
        }
        OperationKind::Search | OperationKind::SearchSubresource => {
            op.consumes.clear();
            op.produces.push(XML_MEDIA_TYPE.into());
            op.summary = Some(format!("Search for {}", name));
            op.description = Some("At least one search parameter must be specified".into());
            op.operation_id = Some(target.fetch_all_operation_id());
            for param in paging_parameters() {
                op.parameter(param);
            }
            op.parameter(representation_parameter());
            op.parameter(search_query_parameter());
            add_type_parameter(target, &mut op);
            op.response(200, ok(name).with_schema(fetch_all_reference()));
        }
        OperationKind::Create => {
            op.summary = Some("Create with properties in request".into());
            op.operation_id = Some(target.operation_id("create"));
            op.parameter(create_body(target));
            op.response(201, ok(name));
        }
        OperationKind::CreateSubresource => {
            op.summary = Some(format!(
                "Create {} subresource with properties in request",
                name
            ));
            op.operation_id = Some(target.operation_id("create"));
            op.parameter(parent_uuid_parameter());
            op.parameter(create_body(target));
            op.response(201, ok(name));
        }
        OperationKind::Update => {
            op.summary = Some("Edit with given uuid, only modifying properties in request".into());
            op.operation_id = Some(target.operation_id("update"));
            op.parameter(Parameter::path("uuid", "uuid of resource to update"));
            op.parameter(update_body(target));
            op.response(201, ok(name));
        }
        OperationKind::UpdateSubresource => {
            op.summary = Some(format!(
                "edit {} subresource with given uuid, only modifying properties in request",
                name
            ));
            op.operation_id = Some(target.operation_id("update"));
            op.parameter(parent_uuid_parameter());
            op.parameter(Parameter::path("uuid", "uuid of resource to update"));
            op.parameter(update_body(target));
            op.response(201, ok(name));
        }
        OperationKind::Delete => {
            op.summary = Some("Delete resource by uuid".into());
            op.operation_id = Some(target.operation_id("delete"));
            op.parameter(Parameter::path("uuid", "uuid to delete"));
            op.response(204, Response::new("Delete successful"));
            op.response(404, not_found());
        }
        OperationKind::DeleteSubresource => {
            op.summary = Some(format!("Delete {} subresource by uuid", name));
            op.operation_id = Some(target.operation_id("delete"));
            op.parameter(parent_uuid_parameter());
            op.parameter(Parameter::path("uuid", "uuid to delete"));
            op.response(204, Response::new("Delete successful"));
            op.response(404, not_found());
        }
        OperationKind::Purge => {
            op.summary = Some("Purge resource by uuid".into());
            op.operation_id = Some(target.operation_id("purge"));
            op.parameter(Parameter::path("uuid", "uuid to delete"));
            op.response(204, Response::new("Delete successful"));
        }
        OperationKind::PurgeSubresource => {
            op.summary = Some(format!("Purge {} subresource by uuid", name));
            op.operation_id = Some(target.operation_id("purge"));
            op.parameter(parent_uuid_parameter());
            op.parameter(Parameter::path("uuid", "uuid to delete"));
            op.response(204, Response::new("Delete successful"));
        }
    }

    op.response(401, Response::new("User not logged in"));
    op
}

/// Add the definitions of one schema family for a resource.
///
/// `Get` adds `Get`, `GetRef` and `GetFull`; `Create` adds `Create` and
/// `CreateFull`; `Update` adds `Update`. Existing entries are replaced.
pub fn create_definitions(
    target: &ResourceTarget<'_>,
    family: SchemaFamily,
    resolver: &PropertyResolver<'_>,
    definitions: &mut IndexMap<String, Schema>,
) {
    let handler = target.handler;
    let models = match family {
        SchemaFamily::Get => vec![
            (
                SchemaContext::Get,
                resolver.get_model(handler, Representation::Default),
            ),
            (
                SchemaContext::GetRef,
                resolver.get_model(handler, Representation::Ref),
            ),
            (
                SchemaContext::GetFull,
                resolver.get_model(handler, Representation::Full),
            ),
        ],
        SchemaFamily::Create => vec![
            (SchemaContext::Create, resolver.create_model(handler, false)),
            (SchemaContext::CreateFull, resolver.create_model(handler, true)),
        ],
        SchemaFamily::Update => vec![(SchemaContext::Update, resolver.update_model(handler))],
    };

    for (context, model) in models {
        definitions.insert(target.definition(context), model);
    }
}

/// Shared `FetchAll` definition returned by fetch-all and search operations.
pub fn fetch_all_definition() -> Schema {
    let link = Schema::object()
        .property("rel", Schema::string().with_example("self"))
        .property("uri", Schema::string().with_format("uri"));
    let result = Schema::object()
        .property("uuid", Schema::string())
        .property("display", Schema::string())
        .property("links", Schema::array(Some(link)));
    Schema::object().property("results", Schema::array(Some(result)))
}

pub(crate) fn fetch_all_reference() -> Schema {
    Schema::reference(crate::types::FETCH_ALL_DEFINITION)
}

pub(crate) fn ok(name: &str) -> Response {
    Response::new(format!("{} response", name))
}

fn not_found() -> Response {
    Response::new("Resource with given uuid doesn't exist")
}

pub(crate) fn paging_parameters() -> [Parameter; 2] {
    [
        Parameter::query("limit", SchemaType::Integer)
            .with_description("The number of results to return"),
        Parameter::query("startIndex", SchemaType::Integer)
            .with_description("The offset at which to start"),
    ]
}

pub(crate) fn representation_parameter() -> Parameter {
    Parameter::query("v", SchemaType::String)
        .with_description("The representation to return (ref, default, full or custom)")
        .with_enum(REPRESENTATION_VALUES.iter().copied())
}

pub(crate) fn search_query_parameter() -> Parameter {
    Parameter::query("q", SchemaType::String).with_description("The search query")
}

pub(crate) fn subclass_type_parameter() -> Parameter {
    Parameter::query("t", SchemaType::String)
        .with_description("The type of Subclass Resource to return")
}

fn add_type_parameter(target: &ResourceTarget<'_>, op: &mut Operation) {
    if target.handler.has_types_defined() {
        op.parameter(subclass_type_parameter());
    }
}

fn parent_uuid_parameter() -> Parameter {
    Parameter::path("parent-uuid", "parent resource uuid")
}

fn create_body(target: &ResourceTarget<'_>) -> Parameter {
    Parameter::body(
        "resource",
        "Resource to create",
        Schema::reference(&target.definition(SchemaContext::Create)),
    )
}

fn update_body(target: &ResourceTarget<'_>) -> Parameter {
    Parameter::body(
        "resource",
        "Resource properties to update",
        Schema::reference(&target.definition(SchemaContext::Update)),
    )
}
