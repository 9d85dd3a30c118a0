//! Handler system for resource queries.
//!
//! - [`ResourceHandler`] - trait integrators implement per resource kind
//! - [`FnHandler`] - adapter for async closures
//! - [`HandlerRegistry`] - append-only kind → handler map
//! - [`ResourceArgs`] - per-request arguments (`type`, `id`, `extra`)

mod registry;
mod traits;
pub(crate) mod types;

pub use registry::{HandlerRegistry, RegistryError};
pub use traits::{FnHandler, HandlerError, ResourceHandler};
pub use types::{ExtraMap, ResourceArgs, parse_extra};
