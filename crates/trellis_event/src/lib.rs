//! # trellis_event - Namespaced Event Emitter
//!
//! Synchronous publish/subscribe with hierarchical event names:
//! - Event names are `:`-separated (`"route:navigated:main"`)
//! - Publishing notifies the exact name, then every shorter prefix
//! - Subscriptions are insertion ordered and removed through their token
//!
//! Any type can gain local eventing by owning an [`Emitter`] and
//! implementing [`Evented`].
//!
//! ## Usage
//!
//! ```ignore
//! let bus = Emitter::new();
//! let sub = bus.subscribe("route", |payload| println!("{payload}"));
//!
//! // Notifies "route:navigated" subscribers, then "route" subscribers
//! bus.publish("route:navigated", json!({ "path": "/home" }));
//!
//! sub.unsubscribe();
//! ```

pub mod emitter;
pub mod evented;

pub use emitter::{Callback, Emitter, EmitterStats, EventNames, Subscription};
pub use evented::Evented;

/// Separator between event name segments
pub const NAMESPACE_SEPARATOR: char = ':';

/// Prelude
pub mod prelude {
    pub use crate::emitter::{Emitter, EmitterStats, EventNames, Subscription};
    pub use crate::evented::Evented;
}
