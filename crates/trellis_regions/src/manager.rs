//! Region manager
//!
//! Owns the named parts of one UI. At most one region is the default, which
//! `show_single` falls back to when several regions exist.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures_util::future::join_all;
use parking_lot::RwLock;
use trellis_core::{Logger, Params};

use crate::error::{RegionError, RegionResult};
use crate::listen::ListenTracker;
use crate::part::{Part, RouteOutcome};
use crate::view_model::{Renderer, ViewModel};

#[derive(Default)]
struct Regions {
    parts: HashMap<String, Part>,
    /// Registration order
    order: Vec<String>,
    default: Option<String>,
}

/// Outcome of fanning a view-model map out to regions
#[derive(Debug, Default)]
pub struct ShowReport {
    /// Regions that were routed, in request order
    pub routed: Vec<(String, RouteOutcome)>,
    /// Requested regions that are not registered
    pub skipped: Vec<String>,
    /// Regions whose route failed
    pub failed: Vec<(String, RegionError)>,
}

impl ShowReport {
    /// Outcome for one region, if it was routed
    pub fn outcome(&self, region: &str) -> Option<RouteOutcome> {
        self.routed
            .iter()
            .find(|(name, _)| name == region)
            .map(|(_, outcome)| *outcome)
    }

    /// Check if every requested region was routed without error
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Manages named regions
#[derive(Clone)]
pub struct RegionManager {
    regions: Arc<RwLock<Regions>>,
    renderer: Arc<dyn Renderer>,
    tracker: ListenTracker,
    logger: Logger,
}

impl RegionManager {
    /// Create a manager rendering through `renderer`
    pub fn new(renderer: Arc<dyn Renderer>, tracker: ListenTracker) -> Self {
        Self::with_logger(renderer, tracker, Logger::new("trellis::regions"))
    }

    /// Create a manager logging through `logger`
    pub fn with_logger(renderer: Arc<dyn Renderer>, tracker: ListenTracker, logger: Logger) -> Self {
        Self {
            regions: Arc::new(RwLock::new(Regions::default())),
            renderer,
            tracker,
            logger,
        }
    }

    /// Register a region
    pub fn register(&self, name: &str, is_default: bool) -> RegionResult<Part> {
        let mut regions = self.regions.write();

        if regions.parts.contains_key(name) {
            return Err(RegionError::AlreadyRegistered(name.to_string()));
        }
        if is_default {
            if let Some(existing) = &regions.default {
                return Err(RegionError::DefaultConflict {
                    existing: existing.clone(),
                    requested: name.to_string(),
                });
            }
            regions.default = Some(name.to_string());
        }

        let part = Part::new(
            name,
            Arc::clone(&self.renderer),
            self.tracker.clone(),
            self.logger.clone(),
        );
        regions.parts.insert(name.to_string(), part.clone());
        regions.order.push(name.to_string());

        self.logger.debug(format_args!(
            "registered region '{}'{}",
            name,
            if is_default { " (default)" } else { "" }
        ));
        Ok(part)
    }

    /// Part registered under `name`
    pub fn part(&self, name: &str) -> Option<Part> {
        self.regions.read().parts.get(name).cloned()
    }

    /// Region names in registration order
    pub fn region_names(&self) -> Vec<String> {
        self.regions.read().order.clone()
    }

    /// The default region, if one was flagged
    pub fn default_region(&self) -> Option<String> {
        self.regions.read().default.clone()
    }

    pub fn len(&self) -> usize {
        self.regions.read().parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.read().parts.is_empty()
    }

    /// Route each view-model to its region
    ///
    /// Unknown regions are logged and skipped. Parts are routed concurrently.
    pub async fn show<I>(&self, views: I, params: Params) -> ShowReport
    where
        I: IntoIterator<Item = (String, Arc<dyn ViewModel>)>,
    {
        let mut report = ShowReport::default();
        let mut routes = Vec::new();

        for (region, view_model) in views {
            match self.part(&region) {
                Some(part) => routes.push((region, part, view_model)),
                None => {
                    self.logger.warn(format_args!(
                        "cannot show '{}' in unknown region '{}'",
                        view_model.name(),
                        region
                    ));
                    report.skipped.push(region);
                }
            }
        }

        let results = join_all(routes.into_iter().map(|(region, part, view_model)| {
            let params = params.clone();
            async move { (region, part.route(view_model, params).await) }
        }))
        .await;

        for (region, result) in results {
            match result {
                Ok(outcome) => report.routed.push((region, outcome)),
                Err(error) => {
                    self.logger
                        .error(format_args!("route into '{}' failed: {}", region, error));
                    report.failed.push((region, error));
                }
            }
        }

        report
    }

    /// Route a view-model to the only region, or to the default region
    pub async fn show_single(
        &self,
        view_model: Arc<dyn ViewModel>,
        params: Params,
    ) -> RegionResult<RouteOutcome> {
        let part = self.single_part()?;
        part.route(view_model, params).await
    }

    fn single_part(&self) -> RegionResult<Part> {
        let regions = self.regions.read();
        let name = match (regions.parts.len(), &regions.default) {
            (1, _) => regions.order.first().cloned(),
            (_, Some(default)) => Some(default.clone()),
            (count, None) => return Err(RegionError::AmbiguousRegion { count }),
        };

        name.and_then(|name| regions.parts.get(&name).cloned())
            .ok_or(RegionError::AmbiguousRegion {
                count: regions.parts.len(),
            })
    }

    /// Destroy every part
    pub fn destroy_all(&self) {
        let parts: Vec<Part> = self.regions.read().parts.values().cloned().collect();
        for part in parts {
            part.destroy();
        }
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl fmt::Debug for RegionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionManager")
            .field("regions", &self.region_names())
            .field("default", &self.default_region())
            .finish()
    }
}
