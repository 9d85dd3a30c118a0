pub mod addon;
pub mod error;
pub mod handlers;
pub mod manifest;
pub mod observability;
pub mod server;

pub use addon::Addon;
pub use error::AddonError;
pub use handlers::{
    FnHandler, HandlerError, HandlerRegistry, RegistryError, ResourceArgs, ResourceHandler,
};
pub use manifest::{
    DefaultLinter, LintReport, MAX_MANIFEST_BYTES, Manifest, ManifestError, ManifestValidator,
};
pub use server::{BindError, ServeOptions, ServerHandle, ServerlessHandlers};
