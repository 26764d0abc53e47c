//! Path assembly for one resource.
//!
//! Every resource contributes at most two URL templates:
//!
//! | Template | Operations |
//! |----------|------------|
//! | `/<name>` or `/<parent>/{parent-uuid}/<name>` | GET fetch-all or search, POST create |
//! | the same plus `/{uuid}` | GET fetch-by-id, POST update, DELETE delete/purge |
//!
//! Operations are only built for entry points the prober reports as
//! implemented, and a template with no operations is not emitted.

use indexmap::IndexMap;
use tracing::debug;

use crate::document::{Operation, Parameter, PathItem, Schema, SchemaType};
use crate::handler::SearchConfig;
use crate::operation::{build_operation, ResourceTarget};
use crate::probe::is_implemented;
use crate::properties::PropertyResolver;
use crate::search;
use crate::types::{Action, OperationKind};

/// Collection URL template of a resource.
pub fn collection_path(name: &str, parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("/{}/{{parent-uuid}}/{}", parent, name),
        None => format!("/{}", name),
    }
}

/// Item URL template of a resource.
pub fn item_path(name: &str, parent: Option<&str>) -> String {
    format!("{}/{{uuid}}", collection_path(name, parent))
}

/// Build the path entries of one resource, adding referenced definitions.
pub fn assemble(
    target: &ResourceTarget<'_>,
    search_configs: &[SearchConfig],
    resolver: &PropertyResolver<'_>,
    definitions: &mut IndexMap<String, Schema>,
) -> Vec<(String, PathItem)> {
    let sub = target.is_subresource();
    let place = |entry: &mut PathItem, action: Action, definitions: &mut IndexMap<String, Schema>| {
        if is_implemented(target.handler, action) {
            let kind = OperationKind::new(action, sub);
            entry.set(kind.method(), build_operation(target, kind, resolver, definitions));
        }
    };

    let mut collection = PathItem::default();
    place(&mut collection, Action::FetchAll, definitions);
    search::augment(target, &mut collection, search_configs, resolver, definitions);
    place(&mut collection, Action::Create, definitions);

    let mut item = PathItem::default();
    place(&mut item, Action::FetchById, definitions);
    place(&mut item, Action::Update, definitions);
    place(&mut item, Action::Delete, definitions);
    if is_implemented(target.handler, Action::Purge) {
        match item.delete.as_mut() {
            Some(delete) => collapse_purge(delete),
            None => place(&mut item, Action::Purge, definitions),
        }
    }

    let mut paths = Vec::with_capacity(2);
    for (path, entry) in [
        (collection_path(target.name, target.parent), collection),
        (item_path(target.name, target.parent), item),
    ] {
        if entry.is_empty() {
            debug!(path = %path, "no operations, skipping path");
            continue;
        }
        paths.push((path, entry));
    }
    paths
}

/// Fold purge into an existing DELETE as an optional `purge` flag.
fn collapse_purge(delete: &mut Operation) {
    delete.summary = Some("Delete or purge resource by uuid".into());
    delete.description = Some("The resource will be voided/retired unless purge = 'true'".into());
    delete.parameter(Parameter::query("purge", SchemaType::Boolean));
}
