pub(crate) mod routes;
mod run;
mod serverless;
pub(crate) mod state;

pub use run::{BindError, DEFAULT_CACHE_MAX_AGE, ServeOptions, ServerHandle};
pub(crate) use run::serve;
pub use serverless::ServerlessHandlers;
pub use state::AddonState;
