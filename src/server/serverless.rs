//! Per-route standalone handlers.
//!
//! Each produced router serves exactly one route (the manifest, or one
//! resource kind with the kind fixed at binding time) and terminates every
//! invocation: anything the route does not match falls through to a 404.
//! This makes each router usable as an isolated request handler outside a
//! persistent server process, e.g. one invocation per external trigger.

use std::collections::BTreeMap;

use axum::{
    Router,
    extract::{Path, State},
    http::Uri,
    response::Response,
    routing::get,
};

use super::routes::{cors_layer, dispatch, fallback_404, not_found, serve_manifest};
use super::state::AddonState;

/// The set of standalone routers produced for an addon: one for the
/// manifest plus one per resource kind.
pub struct ServerlessHandlers {
    manifest: Router,
    resources: BTreeMap<String, Router>,
}

impl ServerlessHandlers {
    pub(crate) fn new(state: AddonState, kinds: Vec<String>) -> Self {
        let manifest = Router::new()
            .route("/manifest.json", get(serve_manifest))
            .with_state(state.clone())
            .fallback(fallback_404)
            .layer(cors_layer());

        let resources = kinds
            .into_iter()
            .map(|kind| {
                let router = resource_router(state.clone(), &kind);
                (kind, router)
            })
            .collect();

        Self { manifest, resources }
    }

    /// Standalone router serving only `/manifest.json`.
    pub fn manifest(&self) -> Router {
        self.manifest.clone()
    }

    /// Standalone router for one resource kind, or `None` when the kind is
    /// neither declared in the manifest nor registered.
    pub fn resource(&self, kind: &str) -> Option<Router> {
        self.resources.get(kind).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

/// Builds a router bound to a single resource kind. The kind is fixed here
/// rather than taken from the path, so a stray path segment can never
/// select a different handler.
fn resource_router(state: AddonState, kind: &str) -> Router {
    let plain_kind = kind.to_string();
    let extra_kind = kind.to_string();

    Router::new()
        .route(
            &format!("/{kind}/{{type}}/{{id}}"),
            get(
                move |State(state): State<AddonState>,
                      Path((r#type, id)): Path<(String, String)>,
                      uri: Uri| {
                    let kind = plain_kind.clone();
                    async move { dispatch_fixed(&state, &kind, r#type, id, "", &uri).await }
                },
            ),
        )
        .route(
            &format!("/{kind}/{{type}}/{{id}}/{{*extra}}"),
            get(
                move |State(state): State<AddonState>,
                      Path((r#type, id, extra)): Path<(String, String, String)>,
                      uri: Uri| {
                    let kind = extra_kind.clone();
                    async move {
                        let Some(extra) = extra.strip_suffix(".json") else {
                            return not_found(&uri);
                        };
                        dispatch(&state, &kind, r#type, id, extra, &uri).await
                    }
                },
            ),
        )
        .with_state(state)
        .fallback(fallback_404)
        .layer(cors_layer())
}

async fn dispatch_fixed(
    state: &AddonState,
    kind: &str,
    r#type: String,
    id: String,
    raw_extra: &str,
    uri: &Uri,
) -> Response {
    let Some(id) = id.strip_suffix(".json") else {
        return not_found(uri);
    };
    dispatch(state, kind, r#type, id.to_string(), raw_extra, uri).await
}
