use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::types::ResourceArgs;

/// Handler-reported failure.
///
/// The dispatcher logs the full error server-side and answers the client
/// with a generic 500 body; none of these variants ever reach the wire.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("resource unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        HandlerError::Message(message.into())
    }

    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        HandlerError::Other(Box::new(err))
    }
}

/// Resource query handler supplied by the integrator.
///
/// One handler serves one resource kind ("stream", "meta", ...). Handlers
/// may perform async I/O; the dispatcher awaits completion before writing
/// the response. The returned value is serialized as-is, the dispatcher
/// does not validate its shape.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    async fn handle(&self, args: ResourceArgs) -> Result<Value, HandlerError>;
}

/// Adapter turning an async closure into a [`ResourceHandler`].
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> ResourceHandler for FnHandler<F>
where
    F: Fn(ResourceArgs) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn handle(&self, args: ResourceArgs) -> Result<Value, HandlerError> {
        (self.0)(args).await
    }
}
