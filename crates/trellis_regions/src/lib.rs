//! # trellis_regions - Region/Part Lifecycle Engine
//!
//! Mounts view-models into named regions and drives their lifecycle:
//!
//! ```text
//! Empty -> BeforeShowing -> Showing -> (hide -> BeforeShowing -> Showing)* -> Destroyed
//! ```
//!
//! - [`RegionManager`] owns the named regions and fans route results out to them
//! - [`Part`] is one region slot with its currently shown view-model
//! - [`ListenTracker`] lets `show` wait until in-flight transport calls settle
//! - [`RegionManager::attach_router`] drives regions from `routeNavigated` events
//!
//! ## Usage
//!
//! ```ignore
//! let regions = RegionManager::new(renderer, ListenTracker::new());
//! regions.register("main", true)?;
//! regions.register("sidebar", false)?;
//!
//! regions.show(vec![("main".into(), home_vm)], json!({})).await;
//! ```

pub mod error;
pub mod listen;
pub mod manager;
pub mod part;
pub mod router;
pub mod view_model;

pub use error::{RegionError, RegionResult};
pub use listen::{InFlight, ListenTracker};
pub use manager::{RegionManager, ShowReport};
pub use part::{Part, PartState, RouteOutcome};
pub use router::{RouteNavigation, ViewModelResolver, ROUTE_NAVIGATED};
pub use view_model::{Capabilities, Deferred, Renderer, ViewModel};

pub mod prelude {
    pub use crate::error::{RegionError, RegionResult};
    pub use crate::listen::ListenTracker;
    pub use crate::manager::{RegionManager, ShowReport};
    pub use crate::part::{Part, PartState, RouteOutcome};
    pub use crate::router::{RouteNavigation, ViewModelResolver, ROUTE_NAVIGATED};
    pub use crate::view_model::{Capabilities, Deferred, Renderer, ViewModel};
}
