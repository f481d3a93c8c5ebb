/// HTTP server for the Student Store.
///
/// This module provides the [`Router`] which serves the JSON API and the static
/// frontend, dispatching API calls to the underlying store.
pub mod error;
pub mod router;

pub use error::ApiError;
pub use router::{build_router, Router};
