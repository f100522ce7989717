//! Router wiring
//!
//! The router publishes `routeNavigated` with a payload shaped like
//! `{ "route": { "options": { "<region>": "<view-model name>" } }, "options": {...} }`.
//! Each named view-model is resolved and shown in its region with the
//! top-level `options` as show parameters.

use std::sync::Arc;

use trellis_core::{empty_params, Params};
use trellis_event::{Emitter, Subscription};
use trellis_inject::Injector;

use crate::manager::RegionManager;
use crate::view_model::ViewModel;

/// Event the router publishes after navigation
pub const ROUTE_NAVIGATED: &str = "routeNavigated";

/// Looks up view-models by name
pub trait ViewModelResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn ViewModel>>;
}

/// View-models are registered in the injector as `Arc<dyn ViewModel>` modules
impl ViewModelResolver for Injector {
    fn resolve(&self, name: &str) -> Option<Arc<dyn ViewModel>> {
        self.get_as::<Arc<dyn ViewModel>>(name)
            .map(|view_model| Arc::clone(&*view_model))
            .ok()
    }
}

/// Parsed `routeNavigated` payload
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNavigation {
    /// (region, view-model name) pairs
    pub views: Vec<(String, String)>,
    /// Parameters handed to each view-model
    pub options: Params,
}

impl RouteNavigation {
    /// Parse a payload; `None` if it has no `route.options` object
    pub fn from_payload(payload: &Params) -> Option<Self> {
        let route_options = payload.get("route")?.get("options")?.as_object()?;

        let views = route_options
            .iter()
            .filter_map(|(region, name)| {
                name.as_str()
                    .map(|name| (region.clone(), name.to_string()))
            })
            .collect();

        let options = payload.get("options").cloned().unwrap_or_else(empty_params);

        Some(Self { views, options })
    }
}

impl RegionManager {
    /// Show routed view-models whenever `bus` publishes [`ROUTE_NAVIGATED`]
    ///
    /// Routing runs on the current tokio runtime; outside a runtime the
    /// navigation is logged and dropped.
    pub fn attach_router(&self, bus: &Emitter, resolver: Arc<dyn ViewModelResolver>) -> Subscription {
        let manager = self.clone();

        bus.subscribe(ROUTE_NAVIGATED, move |payload| {
            let logger = manager.logger();
            let Some(navigation) = RouteNavigation::from_payload(payload) else {
                logger.warn(format_args!("ignoring malformed {} payload", ROUTE_NAVIGATED));
                return;
            };

            let views: Vec<(String, Arc<dyn ViewModel>)> = navigation
                .views
                .iter()
                .filter_map(|(region, name)| match resolver.resolve(name) {
                    Some(view_model) => Some((region.clone(), view_model)),
                    None => {
                        logger.warn(format_args!(
                            "no view-model named '{}' for region '{}'",
                            name, region
                        ));
                        None
                    }
                })
                .collect();

            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let manager = manager.clone();
                    handle.spawn(async move {
                        manager.show(views, navigation.options).await;
                    });
                }
                Err(_) => logger.error(format_args!(
                    "{} received outside a tokio runtime",
                    ROUTE_NAVIGATED
                )),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_navigation() {
        let payload = json!({
            "route": { "options": { "main": "homeViewModel", "side": 3 } },
            "options": { "id": 7 }
        });

        let navigation = RouteNavigation::from_payload(&payload).unwrap();
        assert_eq!(
            navigation.views,
            vec![("main".to_string(), "homeViewModel".to_string())]
        );
        assert_eq!(navigation.options, json!({ "id": 7 }));
    }

    #[test]
    fn test_parse_without_options_defaults_to_empty() {
        let payload = json!({ "route": { "options": {} } });
        let navigation = RouteNavigation::from_payload(&payload).unwrap();
        assert!(navigation.views.is_empty());
        assert_eq!(navigation.options, json!({}));
    }

    #[test]
    fn test_parse_rejects_missing_route() {
        assert!(RouteNavigation::from_payload(&json!({ "options": {} })).is_none());
    }

    struct Home;

    impl ViewModel for Home {
        fn name(&self) -> &str {
            "home"
        }
    }

    #[test]
    fn test_injector_resolves_view_models() {
        let injector = Injector::new();
        injector.provide_value("homeViewModel", Arc::new(Home) as Arc<dyn ViewModel>);

        let resolved = injector.resolve("HomeViewModel").unwrap();
        assert_eq!(resolved.name(), "home");
        assert!(injector.resolve("missing").is_none());
    }
}
