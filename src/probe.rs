//! Capability probing.
//!
//! Handlers don't declare which operations they support, so each entry point
//! is invoked with sentinel arguments and the outcome classified:
//!
//! | Outcome | Capability |
//! |---------|------------|
//! | `Ok(_)` | `Implemented` |
//! | `UnsupportedOperation` | `Unsupported` |
//! | any other error | `Assumed` (reported as implemented) |
//!
//! Probing runs real handler code. Handlers must tolerate being called with
//! [`IMPOSSIBLE_UNIQUE_ID`] and empty bodies.

use tracing::{debug, warn};

use crate::handler::{RequestContext, ResourceHandler, SimpleObject};
use crate::types::{Action, Capability, IMPOSSIBLE_UNIQUE_ID};

/// Probe one entry point of a handler.
pub fn probe(handler: &dyn ResourceHandler, action: Action) -> Capability {
    let context = RequestContext::default();

    let outcome = match action {
        Action::FetchAll => handler.get_all(&context),
        Action::FetchById => handler.get_by_unique_id(IMPOSSIBLE_UNIQUE_ID),
        Action::Search => handler.search(&context),
        Action::Create => handler.create(&SimpleObject::new(), &context),
        Action::Update => {
            let body = update_probe_body(handler);
            handler.update(IMPOSSIBLE_UNIQUE_ID, &body, &context)
        }
        Action::Delete => handler.delete(IMPOSSIBLE_UNIQUE_ID, "", &context),
        Action::Purge => handler.purge(IMPOSSIBLE_UNIQUE_ID, &context),
    };

    let capability = match outcome {
        Ok(_) => Capability::Implemented,
        Err(e) if e.is_unsupported() => Capability::Unsupported,
        Err(e) => {
            debug!(
                handler = handler.class_name(),
                entry_point = action.entry_point(),
                error = %e,
                "probe failed for an unrelated reason, assuming implemented"
            );
            Capability::Assumed
        }
    };

    debug!(
        handler = handler.class_name(),
        entry_point = action.entry_point(),
        ?capability,
        "probed entry point"
    );
    capability
}

/// Whether the handler implements `action`.
pub fn is_implemented(handler: &dyn ResourceHandler, action: Action) -> bool {
    probe(handler, action).is_implemented()
}

/// Body for the update probe: every updatable property mapped to its own name.
fn update_probe_body(handler: &dyn ResourceHandler) -> SimpleObject {
    let mut body = SimpleObject::new();
    match handler.updatable_properties() {
        Ok(Some(description)) => {
            for property in description.properties {
                body.insert(property.clone(), property.into());
            }
        }
        Ok(None) => {}
        Err(e) => warn!(
            handler = handler.class_name(),
            error = %e,
            "could not list updatable properties for update probe"
        ),
    }
    body
}
