use thiserror::Error;

use crate::handlers::RegistryError;
use crate::manifest::ManifestError;
use crate::server::BindError;

/// Top-level addon error.
///
/// Manifest and registry variants are fatal configuration errors raised
/// during setup; the bind variant is the only one produced after
/// construction, when starting the listener.
#[derive(Debug, Error)]
pub enum AddonError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Bind(#[from] BindError),
}
