//! Property resolution: from a resource's declared properties to schema models.
//!
//! # Type mapping
//!
//! | Field type | Schema |
//! |------------|--------|
//! | string | `string` |
//! | integer | `integer` (int32) |
//! | boolean | `boolean` |
//! | UUID | `string`, described `uuid` |
//! | date | `string` (date) |
//! | double | `number` (double) |
//! | domain enum | `string`, described `enum` |
//! | domain class | `$ref` to `<Title><Suffix>` |
//! | collection of domain class | `array` of `$ref` |
//! | other collection | `array` |
//! | anything else | `object` |
//!
//! Resolution never fails: a missing field, an unknown modelled type or an
//! unindexed domain class all degrade to a plain `string`.

use tracing::{debug, warn};

use crate::document::Schema;
use crate::error::HandlerError;
use crate::handler::{DomainModel, FieldType, ResourceDescription, ResourceHandler};
use crate::index::ResourceIndex;
use crate::types::{Representation, SchemaContext};

/// Default prefix identifying domain classes.
pub const DEFAULT_DOMAIN_NAMESPACE: &str = "org.openmrs";

/// The domain class a handler exposes.
///
/// Walks the hierarchy nearest-first. At each level interfaces are checked
/// before the superclass; the first generic supertype whose first argument is
/// concrete wins.
pub fn supported_type(handler: &dyn ResourceHandler) -> Option<String> {
    for level in handler.type_hierarchy() {
        let candidates = level.interfaces.iter().chain(level.superclass.iter());
        for generic in candidates {
            if let Some(class) = generic.concrete_argument() {
                return Some(class.to_string());
            }
        }
    }
    None
}

pub struct PropertyResolver<'a> {
    index: &'a ResourceIndex,
    domain: &'a dyn DomainModel,
    namespace: &'a str,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(index: &'a ResourceIndex, domain: &'a dyn DomainModel, namespace: &'a str) -> Self {
        Self {
            index,
            domain,
            namespace,
        }
    }

    /// Schema for one property of a handler's modelled type.
    pub fn resolve_property(
        &self,
        handler: &dyn ResourceHandler,
        property: &str,
        context: SchemaContext,
    ) -> Schema {
        let Some(class) = supported_type(handler) else {
            debug!(
                handler = handler.class_name(),
                property, "no modelled type found, using string property"
            );
            return Schema::string();
        };

        match self.domain.field_type(&class, property) {
            Some(field) => self.schema_for_field(&field, context),
            None => {
                debug!(
                    class = %class,
                    property, "field not found, using string property"
                );
                Schema::string()
            }
        }
    }

    /// Schema for a declared field type.
    pub fn schema_for_field(&self, field: &FieldType, context: SchemaContext) -> Schema {
        match field {
            FieldType::String => Schema::string(),
            FieldType::Integer => Schema::integer(),
            FieldType::Boolean => Schema::boolean(),
            FieldType::Uuid => Schema::string().with_description("uuid"),
            FieldType::Date => Schema::date(),
            FieldType::Double => Schema::double(),
            FieldType::Class { name } if self.is_domain_class(name) => {
                if let Some(constants) = self.domain.enum_constants(name) {
                    return Schema::string()
                        .with_description("enum")
                        .with_enum(constants);
                }
                match self.index.resource_title(name) {
                    Some(title) => Schema::reference(&definition_name(title, context)),
                    None => {
                        debug!(class = %name, "no resource supports class, using string property");
                        Schema::string()
                    }
                }
            }
            FieldType::Class { .. } => Schema::object(),
            FieldType::Collection {
                element: Some(element),
            } if self.is_domain_class(element) => match self.index.subresource_title(element) {
                Some(title) => Schema::array(Some(Schema::reference(&definition_name(title, context)))),
                None => {
                    debug!(class = %element, "no resource supports element class, using string property");
                    Schema::string()
                }
            },
            FieldType::Collection { .. } => Schema::array(None),
        }
    }

    fn is_domain_class(&self, class: &str) -> bool {
        class.starts_with(self.namespace)
    }

    /// `Get`, `GetRef` or `GetFull` model for a representation.
    pub fn get_model(&self, handler: &dyn ResourceHandler, representation: Representation) -> Schema {
        let (context, with_identity) = match representation {
            Representation::Default => (SchemaContext::Get, true),
            Representation::Ref => (SchemaContext::GetRef, true),
            Representation::Full => (SchemaContext::GetFull, false),
        };
        let description = handler.representation_description(representation);
        let label = representation.as_str();
        self.model(handler, description, context, with_identity, label)
    }

    /// `Create` or `CreateFull` model.
    pub fn create_model(&self, handler: &dyn ResourceHandler, full: bool) -> Schema {
        let context = if full {
            SchemaContext::CreateFull
        } else {
            SchemaContext::Create
        };
        self.model(handler, handler.creatable_properties(), context, false, "creatable")
    }

    /// `Update` model.
    pub fn update_model(&self, handler: &dyn ResourceHandler) -> Schema {
        self.model(
            handler,
            handler.updatable_properties(),
            SchemaContext::Update,
            false,
            "updatable",
        )
    }

    fn model(
        &self,
        handler: &dyn ResourceHandler,
        description: Result<Option<ResourceDescription>, HandlerError>,
        context: SchemaContext,
        with_identity: bool,
        label: &str,
    ) -> Schema {
        let mut model = Schema::object();
        if with_identity {
            model = model
                .property(
                    "uuid",
                    Schema::string().with_description("Unique identifier of the resource"),
                )
                .property(
                    "display",
                    Schema::string().with_description("Display name of the resource"),
                );
        }

        match description {
            Ok(Some(description)) => {
                for property in &description.properties {
                    let schema = self.resolve_property(handler, property, context);
                    model = model.property(property.clone(), schema);
                }
            }
            Ok(None) => {}
            Err(e) => warn!(
                handler = handler.class_name(),
                error = %e,
                "could not get {} properties", label
            ),
        }
        model
    }
}

/// Definition name for a resource title in a schema context.
pub fn definition_name(title: &str, context: SchemaContext) -> String {
    format!("{}{}", title, context.suffix())
}
