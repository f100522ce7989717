//! Part: one region slot and the view-model shown in it
//!
//! Routing a new view-model hides the outgoing one, awaits its
//! `before_show` deferral, waits for in-flight operations when the
//! view-model has a `show` hook, renders, then calls `show` and
//! `after_show`. Every route bumps the slot generation; a route that
//! finds a newer generation after a suspension point stops there and
//! reports [`RouteOutcome::Superseded`].

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{Logger, Params};

use crate::error::{RegionError, RegionResult};
use crate::listen::ListenTracker;
use crate::view_model::{Renderer, ViewModel};

/// Lifecycle state of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    /// Nothing routed yet
    Empty,
    /// A view-model is being prepared
    BeforeShowing,
    /// A view-model is rendered and shown
    Showing,
    /// Terminal
    Destroyed,
}

/// Result of routing a view-model into a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Rendered and shown
    Shown,
    /// A newer route replaced this one before it finished
    Superseded,
    /// The same view-model instance is already current
    Unchanged,
}

struct Slot {
    state: PartState,
    current: Option<Arc<dyn ViewModel>>,
    generation: u64,
}

fn same_view_model(a: &Arc<dyn ViewModel>, b: &Arc<dyn ViewModel>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// A region slot
#[derive(Clone)]
pub struct Part {
    region: Arc<str>,
    slot: Arc<Mutex<Slot>>,
    renderer: Arc<dyn Renderer>,
    tracker: ListenTracker,
    logger: Logger,
}

impl Part {
    /// Create an empty part for `region`
    pub fn new(
        region: impl Into<String>,
        renderer: Arc<dyn Renderer>,
        tracker: ListenTracker,
        logger: Logger,
    ) -> Self {
        Self {
            region: Arc::from(region.into()),
            slot: Arc::new(Mutex::new(Slot {
                state: PartState::Empty,
                current: None,
                generation: 0,
            })),
            renderer,
            tracker,
            logger,
        }
    }

    /// Region name
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Current lifecycle state
    pub fn state(&self) -> PartState {
        self.slot.lock().state
    }

    /// View-model currently bound to the slot
    pub fn current(&self) -> Option<Arc<dyn ViewModel>> {
        self.slot.lock().current.clone()
    }

    /// Route a view-model into this part
    pub async fn route(
        &self,
        view_model: Arc<dyn ViewModel>,
        params: Params,
    ) -> RegionResult<RouteOutcome> {
        let (generation, previous) = {
            let mut slot = self.slot.lock();
            if slot.state == PartState::Destroyed {
                return Err(RegionError::Destroyed(self.region.to_string()));
            }
            if let Some(current) = &slot.current {
                if same_view_model(current, &view_model) {
                    return Ok(RouteOutcome::Unchanged);
                }
            }
            slot.generation += 1;
            slot.state = PartState::BeforeShowing;
            let previous = slot.current.replace(Arc::clone(&view_model));
            (slot.generation, previous)
        };

        if let Some(previous) = previous {
            if previous.capabilities().hide {
                previous.hide();
            }
        }

        self.logger.debug(format_args!(
            "region '{}' before_show '{}'",
            self.region,
            view_model.name()
        ));
        if let Some(deferred) = view_model.before_show(&params) {
            deferred.await;
        }
        if self.is_superseded(generation) {
            return Ok(self.superseded(view_model.as_ref()));
        }

        let capabilities = view_model.capabilities();
        if capabilities.show {
            self.tracker.settled().await;
            if self.is_superseded(generation) {
                return Ok(self.superseded(view_model.as_ref()));
            }
        }

        if let Err(message) = self.renderer.render(&self.region, view_model.as_ref()) {
            // Unbind the failed view-model
            let mut slot = self.slot.lock();
            if slot.generation == generation && slot.state != PartState::Destroyed {
                slot.current = None;
                slot.state = PartState::Empty;
            }
            return Err(RegionError::Render {
                region: self.region.to_string(),
                message,
            });
        }

        if capabilities.show {
            view_model.show(&params);
        }

        {
            let mut slot = self.slot.lock();
            if slot.generation != generation || slot.state == PartState::Destroyed {
                drop(slot);
                return Ok(self.superseded(view_model.as_ref()));
            }
            slot.state = PartState::Showing;
        }

        if capabilities.after_show {
            view_model.after_show();
        }

        Ok(RouteOutcome::Shown)
    }

    /// Destroy the part; the current view-model gets its `destroy` hook
    pub fn destroy(&self) {
        let current = {
            let mut slot = self.slot.lock();
            if slot.state == PartState::Destroyed {
                return;
            }
            slot.state = PartState::Destroyed;
            slot.generation += 1;
            slot.current.take()
        };

        if let Some(view_model) = current {
            if view_model.capabilities().destroy {
                view_model.destroy();
            }
        }
    }

    fn is_superseded(&self, generation: u64) -> bool {
        let slot = self.slot.lock();
        slot.generation != generation || slot.state == PartState::Destroyed
    }

    fn superseded(&self, view_model: &dyn ViewModel) -> RouteOutcome {
        self.logger.debug(format_args!(
            "region '{}' dropped stale route to '{}'",
            self.region,
            view_model.name()
        ));
        RouteOutcome::Superseded
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("Part")
            .field("region", &self.region)
            .field("state", &slot.state)
            .field("current", &slot.current.as_ref().map(|vm| vm.name().to_string()))
            .finish()
    }
}
