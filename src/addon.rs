//! The addon itself: manifest validation at construction, handler
//! definition, and the entry points into the dispatch core (persistent
//! server, composable router, serverless routers).

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use bytes::Bytes;
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use crate::error::AddonError;
use crate::handlers::{FnHandler, HandlerError, HandlerRegistry, ResourceArgs, ResourceHandler};
use crate::manifest::{DefaultLinter, MAX_MANIFEST_BYTES, Manifest, ManifestError, ManifestValidator};
use crate::observability::Metrics;
use crate::server::{
    AddonState, ServeOptions, ServerHandle, ServerlessHandlers, routes, serve,
};

/// A resource addon: an immutable manifest plus a registry of resource
/// handlers, exposed over the fixed JSON-over-HTTP query protocol.
///
/// Construction fail-fasts on manifest problems; afterwards the manifest
/// buffer never changes and every `/manifest.json` response is
/// byte-identical.
pub struct Addon {
    manifest: Manifest,
    manifest_buf: Bytes,
    registry: HandlerRegistry,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for Addon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Addon")
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

impl Addon {
    /// Builds an addon using the built-in lint rules.
    pub fn new(manifest: Manifest) -> Result<Self, AddonError> {
        Self::with_validator(manifest, &DefaultLinter)
    }

    /// Builds an addon with a caller-supplied lint rule set.
    ///
    /// Any lint error aborts construction with the first reported error.
    /// Warnings are logged and otherwise ignored. The manifest is then
    /// serialized exactly once; a serialized size above
    /// [`MAX_MANIFEST_BYTES`] is a fatal configuration error.
    pub fn with_validator(
        manifest: Manifest,
        validator: &dyn ManifestValidator,
    ) -> Result<Self, AddonError> {
        let report = validator.validate(&manifest);
        if !report.valid() {
            let first = report
                .errors
                .into_iter()
                .next()
                .unwrap_or_else(|| "manifest failed validation".to_string());
            return Err(ManifestError::Lint(first).into());
        }
        for warning in &report.warnings {
            warn!(manifest_id = %manifest.id, warning = %warning, "manifest lint warning");
        }

        let buf = serde_json::to_vec(&manifest).map_err(ManifestError::Serialize)?;
        if buf.len() > MAX_MANIFEST_BYTES {
            return Err(ManifestError::TooLarge(buf.len()).into());
        }

        Ok(Self {
            manifest,
            manifest_buf: Bytes::from(buf),
            registry: HandlerRegistry::new(),
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Registers the handler for a resource kind. A kind can be defined at
    /// most once; a second definition fails immediately and leaves the
    /// first handler in effect.
    pub fn define_resource_handler(
        &mut self,
        kind: impl Into<String>,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), AddonError> {
        self.registry.register(kind, handler)?;
        Ok(())
    }

    /// Closure variant of [`Self::define_resource_handler`].
    pub fn define_resource_fn<F, Fut>(
        &mut self,
        kind: impl Into<String>,
        handler: F,
    ) -> Result<(), AddonError>
    where
        F: Fn(ResourceArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.define_resource_handler(kind, Arc::new(FnHandler(handler)))
    }

    pub fn define_stream_handler(
        &mut self,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), AddonError> {
        self.define_resource_handler("stream", handler)
    }

    pub fn define_meta_handler(
        &mut self,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), AddonError> {
        self.define_resource_handler("meta", handler)
    }

    pub fn define_catalog_handler(
        &mut self,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), AddonError> {
        self.define_resource_handler("catalog", handler)
    }

    pub fn define_subtitles_handler(
        &mut self,
        handler: Arc<dyn ResourceHandler>,
    ) -> Result<(), AddonError> {
        self.define_resource_handler("subtitles", handler)
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The single cached serialization served on `/manifest.json`.
    pub fn manifest_bytes(&self) -> Bytes {
        self.manifest_buf.clone()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Resource kinds the addon answers for: manifest-declared kinds plus
    /// any kind registered explicitly, deduplicated, declaration order
    /// first.
    pub fn resource_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.manifest.resources.clone();
        for kind in self.registry.kinds() {
            if !kinds.iter().any(|k| k == kind) {
                kinds.push(kind.to_string());
            }
        }
        kinds
    }

    fn state(&self) -> AddonState {
        AddonState {
            manifest_buf: self.manifest_buf.clone(),
            registry: Arc::new(self.registry.clone()),
            metrics: self.metrics.clone(),
        }
    }

    /// Composable router with the manifest and resource routes, open CORS,
    /// and no fallback: merge it into a larger router and unmatched
    /// requests fall through to the next handler in the chain.
    ///
    /// The returned router snapshots the registry; handlers defined
    /// afterwards are not visible to it.
    pub fn router(&self) -> Router {
        routes::addon_router(self.state())
    }

    /// The full application router used by [`Self::serve`]: the addon
    /// router plus the terminal 404 fallback and, when enabled, a
    /// `Cache-Control` header on every response.
    pub fn app(&self, options: &ServeOptions) -> Router {
        let mut app = self.router().fallback(routes::fallback_404);

        if let Some(secs) = options.cache_max_age.filter(|secs| *secs > 0) {
            if let Ok(value) = HeaderValue::from_str(&format!("max-age={secs}")) {
                app = app.layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    value,
                ));
            }
        }

        app
    }

    /// Produces the standalone per-route handlers (manifest plus one per
    /// resource kind).
    pub fn serverless_handlers(&self) -> ServerlessHandlers {
        ServerlessHandlers::new(self.state(), self.resource_kinds())
    }

    /// Binds a listener and starts serving. Bind failure is returned as an
    /// error, never panicked.
    pub async fn serve(&self, options: &ServeOptions) -> Result<ServerHandle, AddonError> {
        Ok(serve(self.app(options), options).await?)
    }

    /// [`Self::serve`] with [`ServeOptions::from_env`].
    pub async fn serve_default(&self) -> Result<ServerHandle, AddonError> {
        self.serve(&ServeOptions::from_env()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_manifest() -> Manifest {
        serde_json::from_value(json!({
            "id": "org.example.addon",
            "version": "1.0.0",
            "name": "Example Addon",
            "resources": ["stream", "meta"],
            "types": ["movie"]
        }))
        .unwrap()
    }

    fn noop_handler() -> Arc<dyn ResourceHandler> {
        Arc::new(FnHandler(|_args: ResourceArgs| async {
            Ok(json!({}))
        }))
    }

    #[test]
    fn construction_fails_with_first_lint_error() {
        let mut manifest = sample_manifest();
        manifest.id.clear();
        manifest.version.clear();

        let err = Addon::new(manifest).unwrap_err();
        match err {
            AddonError::Manifest(ManifestError::Lint(msg)) => {
                assert_eq!(msg, "manifest.id must be a non-empty string");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn construction_fails_when_manifest_exceeds_size_limit() {
        let mut manifest = sample_manifest();
        manifest.description = Some("x".repeat(MAX_MANIFEST_BYTES + 1));

        let err = Addon::new(manifest).unwrap_err();
        assert!(matches!(
            err,
            AddonError::Manifest(ManifestError::TooLarge(_))
        ));
    }

    #[test]
    fn warnings_do_not_fail_construction() {
        let mut manifest = sample_manifest();
        manifest.types.clear();

        assert!(Addon::new(manifest).is_ok());
    }

    #[test]
    fn duplicate_handler_definition_fails() {
        let mut addon = Addon::new(sample_manifest()).unwrap();
        addon.define_stream_handler(noop_handler()).unwrap();

        let err = addon.define_stream_handler(noop_handler()).unwrap_err();
        assert!(matches!(err, AddonError::Registry(_)));
        assert!(addon.registry().has_handler("stream"));
    }

    #[test]
    fn manifest_bytes_match_single_serialization() {
        let manifest = sample_manifest();
        let expected = serde_json::to_vec(&manifest).unwrap();

        let addon = Addon::new(manifest).unwrap();
        assert_eq!(addon.manifest_bytes().as_ref(), expected.as_slice());
        assert_eq!(addon.manifest_bytes(), addon.manifest_bytes());
    }

    #[test]
    fn resource_kinds_union_manifest_and_registry() {
        let mut addon = Addon::new(sample_manifest()).unwrap();
        addon.define_resource_fn("addon_catalog", |_args| async { Ok(json!({})) })
            .unwrap();
        addon.define_stream_handler(noop_handler()).unwrap();

        assert_eq!(
            addon.resource_kinds(),
            vec!["stream", "meta", "addon_catalog"]
        );
    }
}
