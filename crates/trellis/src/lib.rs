//! # Trellis
//!
//! Client-side application framework core:
//! - [`event`]: namespaced publish/subscribe
//! - [`inject`]: name-based dependency injection
//! - [`regions`]: view-model lifecycle inside named UI regions
//! - [`dataview`]: chainable queries over in-memory and remote data
//!
//! [`Framework`] wires one of each together and drives regions from
//! `routeNavigated` events.
//!
//! ## Usage
//!
//! ```ignore
//! let config = FrameworkConfig::load()?;
//! trellis::logging::init(&config.logging);
//!
//! let app = Framework::new(config, Arc::new(MyRenderer))?;
//! app.provide_view_model("homeViewModel", HomeViewModel::default);
//! app.navigate(json!({ "main": "homeViewModel" }), json!({ "id": 3 }));
//! ```

pub mod config;
pub mod error;
pub mod framework;
pub mod logging;

pub use trellis_dataview as dataview;
pub use trellis_event as event;
pub use trellis_inject as inject;
pub use trellis_regions as regions;

pub use config::{ConfigError, FrameworkConfig, LoggingConfig, RegionsConfig, RemoteConfig};
pub use error::{FrameworkError, FrameworkResult};
pub use framework::{modules, Framework};
pub use trellis_core::{Logger, Params};

/// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use crate::config::FrameworkConfig;
    pub use crate::error::{FrameworkError, FrameworkResult};
    pub use crate::framework::Framework;
    pub use trellis_core::prelude::*;
    pub use trellis_dataview::prelude::*;
    pub use trellis_event::prelude::*;
    pub use trellis_inject::prelude::*;
    pub use trellis_regions::prelude::*;
}
