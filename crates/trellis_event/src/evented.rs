//! Local eventing through composition
//!
//! A type that owns an [`Emitter`] implements [`Evented`] and gets
//! `subscribe`/`publish_local` forwarding for free.

use trellis_core::Params;

use crate::emitter::{Emitter, EventNames, Subscription};

/// Types that carry their own private emitter
pub trait Evented {
    /// The owned emitter
    fn emitter(&self) -> &Emitter;

    /// Subscribe to this object's local events
    fn subscribe<F>(&self, names: impl Into<EventNames>, callback: F) -> Subscription
    where
        F: Fn(&Params) + Send + Sync + 'static,
        Self: Sized,
    {
        self.emitter().subscribe(names, callback)
    }

    /// Publish on this object's local emitter
    fn publish_local(&self, name: &str, payload: Params) {
        self.emitter().publish(name, payload);
    }
}
