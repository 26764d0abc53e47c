//! Read-only index from supported domain class to resource title.
//!
//! Built in one pass over every handler before any property is resolved, so a
//! property may reference a resource that is processed later.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::handler::ResourceHandler;
use crate::types::model_title;

#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    resources: HashMap<String, String>,
    subresources: HashMap<String, String>,
}

impl ResourceIndex {
    /// Index every handler whose identity can be determined.
    pub fn build<'a, I>(handlers: I) -> Self
    where
        I: IntoIterator<Item = &'a dyn ResourceHandler>,
    {
        let mut index = Self::default();
        for handler in handlers {
            match handler.identity() {
                Ok(identity) => {
                    let title = model_title(identity.resource_name(), identity.parent_name());
                    index.insert(identity.supported_class(), title, identity.is_subresource());
                }
                Err(e) => debug!(
                    handler = handler.class_name(),
                    error = %e,
                    "not indexing handler without identity"
                ),
            }
        }
        index
    }

    fn insert(&mut self, class: &str, title: String, subresource: bool) {
        let target = if subresource {
            &mut self.subresources
        } else {
            &mut self.resources
        };
        if let Some(existing) = target.get(class) {
            warn!(
                class,
                kept = %existing,
                ignored = %title,
                "several resources support the same class, keeping the first"
            );
            return;
        }
        target.insert(class.to_string(), title);
    }

    /// Title of the resource supporting `class`, preferring top-level resources.
    pub fn resource_title(&self, class: &str) -> Option<&str> {
        self.resources
            .get(class)
            .or_else(|| self.subresources.get(class))
            .map(String::as_str)
    }

    /// Title of the resource supporting `class`, preferring sub-resources.
    ///
    /// Collection members are usually exposed as sub-resources of their owner.
    pub fn subresource_title(&self, class: &str) -> Option<&str> {
        self.subresources
            .get(class)
            .or_else(|| self.resources.get(class))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len() + self.subresources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
