//! Application context
//!
//! A [`Framework`] owns the bus, injector, region manager and listen tracker
//! of one application and provides them to the injector under the names in
//! [`modules`]. It is created once at startup and torn down with
//! [`Framework::reset`] between test runs.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::json;
use trellis_core::{Logger, Params};
use trellis_dataview::{DataView, RemoteProvider, TrackedTransport, Transport};
use trellis_event::{Emitter, Subscription};
use trellis_inject::{Creator, Injector};
use trellis_regions::{ListenTracker, Part, RegionManager, Renderer, ViewModel, ROUTE_NAVIGATED};

use crate::config::FrameworkConfig;
use crate::error::FrameworkResult;

/// Names the framework's own modules are provided under
pub mod modules {
    pub const LOGGER: &str = "logger";
    pub const BUS: &str = "bus";
    pub const REGIONS: &str = "regions";
    pub const LISTEN: &str = "listen";
    pub const CONFIG: &str = "config";
    pub const TRANSPORT: &str = "transport";
}

/// Shared context of one application
pub struct Framework {
    config: FrameworkConfig,
    logger: Logger,
    bus: Emitter,
    injector: Injector,
    regions: RegionManager,
    listen: ListenTracker,
    router: Mutex<Option<Subscription>>,
}

impl Framework {
    /// Wire up a framework rendering through `renderer`
    pub fn new(config: FrameworkConfig, renderer: Arc<dyn Renderer>) -> FrameworkResult<Self> {
        let logger = Logger::new("trellis");
        logger.set_enabled(config.logging.enabled);

        let bus = Emitter::with_logger(logger.scoped("trellis::event"));
        let injector = Injector::with_logger(logger.scoped("trellis::inject"));
        let listen = ListenTracker::new();
        let regions =
            RegionManager::with_logger(renderer, listen.clone(), logger.scoped("trellis::regions"));

        if let Some(default_region) = &config.regions.default_region {
            regions.register(default_region, true)?;
        }

        injector.provide_value(modules::LOGGER, logger.clone());
        injector.provide_value(modules::BUS, bus.clone());
        injector.provide_value(modules::REGIONS, regions.clone());
        injector.provide_value(modules::LISTEN, listen.clone());
        injector.provide_value(modules::CONFIG, config.clone());

        let framework = Self {
            config,
            logger,
            bus,
            injector,
            regions,
            listen,
            router: Mutex::new(None),
        };
        framework.attach_router();
        framework.logger.info(format_args!(
            "framework ready with regions {:?}",
            framework.regions.region_names()
        ));
        Ok(framework)
    }

    fn attach_router(&self) {
        let subscription = self
            .regions
            .attach_router(&self.bus, Arc::new(self.injector.clone()));
        if let Some(previous) = self.router.lock().replace(subscription) {
            previous.unsubscribe();
        }
    }

    pub fn config(&self) -> &FrameworkConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn bus(&self) -> &Emitter {
        &self.bus
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    pub fn regions(&self) -> &RegionManager {
        &self.regions
    }

    pub fn listen(&self) -> &ListenTracker {
        &self.listen
    }

    /// Register an additional region
    pub fn register_region(&self, name: &str, is_default: bool) -> FrameworkResult<Part> {
        Ok(self.regions.register(name, is_default)?)
    }

    /// Provide a view-model that is constructed anew on each navigation
    pub fn provide_view_model<V, F>(&self, name: &str, factory: F)
    where
        V: ViewModel + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.injector.provide(
            name,
            Creator::factory(move || Arc::new(factory()) as Arc<dyn ViewModel>),
        );
    }

    /// Provide a view-model instance kept across navigations
    pub fn provide_view_model_instance(&self, name: &str, view_model: Arc<dyn ViewModel>) {
        self.injector.provide_value(name, view_model);
    }

    /// Install the transport remote data views load through
    ///
    /// Calls are tracked so region `show` hooks wait for them.
    pub fn set_transport(&self, transport: Arc<dyn Transport>) {
        let tracked: Arc<dyn Transport> = Arc::new(TrackedTransport::new(transport, self.listen.clone()));
        self.injector.provide_value(modules::TRANSPORT, tracked);
    }

    /// Data view over a remote operation
    ///
    /// `operation` falls back to the configured default operation.
    pub fn remote_view<T>(&self, operation: Option<&str>) -> FrameworkResult<DataView<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let transport = self.injector.get_as::<Arc<dyn Transport>>(modules::TRANSPORT)?;
        let mut provider = RemoteProvider::new(self.config.remote.root_url.clone(), Arc::clone(&transport))
            .with_logger(self.logger.scoped("trellis::dataview"));

        if let Some(operation) = operation.or(self.config.remote.default_operation.as_deref()) {
            provider = provider.with_operation(operation);
        }

        Ok(DataView::new(Arc::new(provider)))
    }

    /// Publish a navigation the way the router does
    ///
    /// `route_options` maps region names to view-model names; `options` are
    /// handed to each view-model's hooks.
    pub fn navigate(&self, route_options: Params, options: Params) {
        self.bus.publish(
            ROUTE_NAVIGATED,
            json!({
                "route": { "options": route_options },
                "options": options,
            }),
        );
    }

    /// Drop every subscription and cached singleton, keeping registrations
    ///
    /// The router is re-attached afterwards.
    pub fn reset(&self) {
        self.bus.clear_all();
        self.injector.clear_singletons();
        self.attach_router();
        self.logger.info(format_args!("framework reset"));
    }
}

impl Drop for Framework {
    fn drop(&mut self) {
        // The router callback holds the injector, which holds the bus
        if let Some(router) = self.router.lock().take() {
            router.unsubscribe();
        }
    }
}

impl fmt::Debug for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framework")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .field("injector", &self.injector)
            .field("regions", &self.regions)
            .finish()
    }
}
