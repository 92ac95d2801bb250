pub mod api;
pub mod error;
pub mod path;
mod worker;

pub use crate::api::Api;
#[cfg(any(test, feature = "mock"))]
pub use crate::api::{MockApi, Request};
pub use crate::worker::HashWorker;
use std::sync::Arc;

pub type ApiHandle = Arc<dyn Api + Send + Sync>;
