//! # trellis_core - Trellis Core
//!
//! Shared primitives used by every other Trellis crate:
//! - [`Logger`]: the gated logging collaborator
//! - [`Params`]: the dynamic payload/parameter bag passed through events,
//!   routes and data-view queries

pub mod logger;

pub use logger::{Level, Logger};

/// Dynamic parameter bag (event payloads, route options, query params)
pub type Params = serde_json::Value;

/// Create an empty parameter bag (`{}`)
pub fn empty_params() -> Params {
    Params::Object(serde_json::Map::new())
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::logger::{Level, Logger};
    pub use crate::{empty_params, Params};
}
