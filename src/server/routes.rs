//! Route dispatch: one inbound resource request, one JSON response.
//!
//! Route shape: `/{resource}/{type}/{id}[/{extra}].json`. The `{resource}`
//! segment selects the handler kind; `{extra}` is an optional `/`-delimited
//! sequence of URL-encoded `key=value` pairs. `/manifest.json` bypasses the
//! registry entirely and serves the cached manifest buffer.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use super::state::AddonState;
use crate::handlers::{HandlerError, ResourceArgs, parse_extra};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const HANDLER_ERROR_BODY: &[u8] = br#"{"err":"handler error"}"#;

/// Every route permits cross-origin requests; the protocol is meant for
/// publicly discoverable addons.
pub(crate) fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// The composable addon router. Carries no fallback so integrators can
/// merge it with their own routes; the served app and serverless routers
/// attach the terminal 404 separately.
pub(crate) fn addon_router(state: AddonState) -> Router {
    Router::new()
        .route("/manifest.json", get(serve_manifest))
        .route("/{resource}/{type}/{id}", get(resource_route))
        .route("/{resource}/{type}/{id}/{*extra}", get(resource_extra_route))
        .with_state(state)
        .layer(cors_layer())
}

pub(crate) async fn serve_manifest(State(state): State<AddonState>) -> Response {
    json_bytes(StatusCode::OK, state.manifest_buf.clone())
}

async fn resource_route(
    State(state): State<AddonState>,
    Path((resource, r#type, id)): Path<(String, String, String)>,
    uri: Uri,
) -> Response {
    let Some(id) = id.strip_suffix(".json") else {
        return not_found(&uri);
    };
    dispatch(&state, &resource, r#type, id.to_string(), "", &uri).await
}

async fn resource_extra_route(
    State(state): State<AddonState>,
    Path((resource, r#type, id, extra)): Path<(String, String, String, String)>,
    uri: Uri,
) -> Response {
    let Some(extra) = extra.strip_suffix(".json") else {
        return not_found(&uri);
    };
    dispatch(&state, &resource, r#type, id, extra, &uri).await
}

/// Resolves the handler for `resource` and turns its outcome into exactly
/// one response. Handler failure detail stays in the server log; the client
/// only ever sees the generic error body.
pub(crate) async fn dispatch(
    state: &AddonState,
    resource: &str,
    r#type: String,
    id: String,
    raw_extra: &str,
    uri: &Uri,
) -> Response {
    let Some(handler) = state.registry.get(resource) else {
        state.metrics.not_found();
        return not_found(uri);
    };

    state.metrics.request_dispatched();

    let args = ResourceArgs {
        r#type,
        id,
        extra: parse_extra(raw_extra),
    };

    let value = match handler.handle(args).await {
        Ok(value) => value,
        Err(err) => return handler_failure(state, resource, &err),
    };

    match serde_json::to_vec(&value) {
        Ok(body) => json_bytes(StatusCode::OK, Bytes::from(body)),
        Err(err) => handler_failure(state, resource, &HandlerError::other(err)),
    }
}

fn handler_failure(state: &AddonState, resource: &str, err: &HandlerError) -> Response {
    error!(resource, error = %err, "resource handler failed");
    state.metrics.handler_error();
    json_bytes(
        StatusCode::INTERNAL_SERVER_ERROR,
        Bytes::from_static(HANDLER_ERROR_BODY),
    )
}

fn json_bytes(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)],
        Body::from(body),
    )
        .into_response()
}

pub(crate) fn not_found(uri: &Uri) -> Response {
    (StatusCode::NOT_FOUND, format!("Cannot GET {uri}")).into_response()
}

pub(crate) async fn fallback_404(uri: Uri) -> Response {
    not_found(&uri)
}
