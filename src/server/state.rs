use std::sync::Arc;

use bytes::Bytes;

use crate::handlers::HandlerRegistry;
use crate::observability::Metrics;

/// Shared, immutable per-request state.
///
/// Built once from the addon during router construction; request handling
/// only ever reads it, so no locking is involved.
#[derive(Clone)]
pub struct AddonState {
    /// Manifest serialized exactly once at construction; served verbatim.
    pub manifest_buf: Bytes,
    pub registry: Arc<HandlerRegistry>,
    pub metrics: Arc<Metrics>,
}
