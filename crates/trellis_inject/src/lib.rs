//! # trellis_inject - Dependency Injector
//!
//! Named-module registry with recursive construction:
//! - Modules are registered under a name and looked up case-insensitively
//! - A creator is either a ready value or a factory with named dependencies
//! - Dependencies resolve depth-first, left-to-right, and are handed to the
//!   factory positionally
//! - Singletons are constructed once and cached; everything else is rebuilt
//!   on every `get`
//!
//! ## Usage
//!
//! ```ignore
//! let injector = Injector::new();
//! injector.provide_value("settings", Settings::default());
//! injector.provide_factory("client", ["settings"], |deps| {
//!     Ok(Client::new(deps.get::<Settings>(0)?))
//! });
//!
//! let client = injector.get_as::<Client>("CLIENT")?;
//! ```

pub mod creator;
pub mod error;
pub mod injector;

pub use creator::{Creator, Dependencies, Factory, Module, Target};
pub use error::{InjectError, InjectResult};
pub use injector::{Injector, Lifetime, SELF_MODULE};

pub mod prelude {
    pub use crate::creator::{Creator, Dependencies, Module, Target};
    pub use crate::error::{InjectError, InjectResult};
    pub use crate::injector::Injector;
}
