//! Module registry and resolution
//!
//! Names are matched case-insensitively but reported in the case they were
//! registered with. The registry lock is never held while a factory runs, so
//! factories may call back into the injector.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use trellis_core::Logger;

use crate::creator::{Creator, Dependencies, Module, Target};
use crate::error::{InjectError, InjectResult};

/// Name the injector registers itself under
pub const SELF_MODULE: &str = "injector";

/// Construction policy of a registered module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Factory runs on every resolution
    Transient,
    /// Factory runs once; the result is cached
    Singleton,
}

struct Entry {
    /// Name in its registered case
    name: String,
    creator: Creator,
    lifetime: Lifetime,
}

#[derive(Default)]
struct Registry {
    /// Keyed by lowercase name
    entries: HashMap<String, Entry>,
    /// Constructed singletons, keyed by lowercase name
    singletons: HashMap<String, Module>,
}

fn key_of(name: &str) -> String {
    name.to_lowercase()
}

/// Dependency injector
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct Injector {
    registry: Arc<RwLock<Registry>>,
    logger: Logger,
}

impl Injector {
    /// Create an injector that provides itself as [`SELF_MODULE`]
    pub fn new() -> Self {
        Self::with_logger(Logger::new("trellis::inject"))
    }

    /// Create an injector logging through `logger`
    pub fn with_logger(logger: Logger) -> Self {
        let injector = Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            logger,
        };
        injector.provide_self();
        injector
    }

    fn provide_self(&self) {
        // Weak so the registry doesn't keep itself alive
        let registry: Weak<RwLock<Registry>> = Arc::downgrade(&self.registry);
        let logger = self.logger.clone();
        self.provide(
            SELF_MODULE,
            Creator::with_dependencies(Vec::<String>::new(), move |_| {
                registry
                    .upgrade()
                    .map(|registry| Injector {
                        registry,
                        logger: logger.clone(),
                    })
                    .ok_or_else(|| InjectError::NotFound(SELF_MODULE.to_string()))
            }),
        );
    }

    /// Register a module; re-registration overwrites
    pub fn provide(&self, name: &str, creator: Creator) {
        self.register(name, creator, Lifetime::Transient);
    }

    /// Register a ready-made value
    pub fn provide_value<T: Any + Send + Sync>(&self, name: &str, value: T) {
        self.provide(name, Creator::value(value));
    }

    /// Register a factory with named dependencies
    pub fn provide_factory<I, S, T, F>(&self, name: &str, dependencies: I, factory: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Any + Send + Sync,
        F: Fn(Dependencies) -> InjectResult<T> + Send + Sync + 'static,
    {
        self.provide(name, Creator::with_dependencies(dependencies, factory));
    }

    /// Register a module constructed at most once
    pub fn singleton(&self, name: &str, creator: Creator) {
        self.register(name, creator, Lifetime::Singleton);
    }

    /// Register a singleton factory with named dependencies
    pub fn singleton_factory<I, S, T, F>(&self, name: &str, dependencies: I, factory: F)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Any + Send + Sync,
        F: Fn(Dependencies) -> InjectResult<T> + Send + Sync + 'static,
    {
        self.singleton(name, Creator::with_dependencies(dependencies, factory));
    }

    fn register(&self, name: &str, creator: Creator, lifetime: Lifetime) {
        let key = key_of(name);
        let mut registry = self.registry.write();

        if let Some(previous) = registry.entries.get(&key) {
            self.logger.debug(format_args!(
                "replacing module '{}' with '{}'",
                previous.name, name
            ));
        }

        registry.singletons.remove(&key);
        registry.entries.insert(
            key,
            Entry {
                name: name.to_string(),
                creator,
                lifetime,
            },
        );
    }

    /// Resolve a registered module
    pub fn get(&self, name: &str) -> InjectResult<Module> {
        self.resolve_name(name, &mut Vec::new())
    }

    /// Resolve a registered module as a concrete type
    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> InjectResult<Arc<T>> {
        self.get(name)?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolve a name or an inline creator
    pub fn create(&self, target: impl Into<Target>) -> InjectResult<Module> {
        match target.into() {
            Target::Name(name) => self.get(&name),
            Target::Creator(creator) => self.construct("<inline>", &creator, &mut Vec::new()),
        }
    }

    fn resolve_name(&self, name: &str, stack: &mut Vec<String>) -> InjectResult<Module> {
        let key = key_of(name);

        if let Some(start) = stack.iter().position(|entry| key_of(entry) == key) {
            let mut chain: Vec<&str> = stack[start..].iter().map(|s| s.as_str()).collect();
            chain.push(name);
            return Err(InjectError::CircularDependency {
                chain: chain.join(" -> "),
            });
        }

        let (registered_name, creator, lifetime) = {
            let registry = self.registry.read();
            if let Some(cached) = registry.singletons.get(&key) {
                return Ok(Arc::clone(cached));
            }
            let entry = registry
                .entries
                .get(&key)
                .ok_or_else(|| InjectError::NotFound(name.to_string()))?;
            (entry.name.clone(), entry.creator.clone(), entry.lifetime)
        };

        stack.push(registered_name.clone());
        let result = self.construct(&registered_name, &creator, stack);
        stack.pop();

        let module = result?;
        if lifetime == Lifetime::Singleton {
            let mut registry = self.registry.write();
            // Another caller may have finished first; keep the first instance
            let cached = registry
                .singletons
                .entry(key)
                .or_insert_with(|| Arc::clone(&module));
            return Ok(Arc::clone(cached));
        }

        Ok(module)
    }

    fn construct(&self, name: &str, creator: &Creator, stack: &mut Vec<String>) -> InjectResult<Module> {
        match creator {
            Creator::Value(value) => Ok(Arc::clone(value)),
            Creator::Factory {
                dependencies,
                factory,
            } => {
                let modules = dependencies
                    .iter()
                    .map(|dependency| self.resolve_name(dependency, stack))
                    .collect::<InjectResult<Vec<_>>>()?;
                self.logger.debug(format_args!(
                    "constructing '{}' with {} dependencies",
                    name,
                    modules.len()
                ));
                factory(Dependencies::new(name, modules))
            }
        }
    }

    /// Check if a module is registered
    pub fn contains(&self, name: &str) -> bool {
        self.registry.read().entries.contains_key(&key_of(name))
    }

    /// Lifetime of a registered module
    pub fn lifetime(&self, name: &str) -> Option<Lifetime> {
        self.registry
            .read()
            .entries
            .get(&key_of(name))
            .map(|entry| entry.lifetime)
    }

    /// Registered names in their original case, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .read()
            .entries
            .values()
            .map(|entry| entry.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Remove a module and any cached singleton
    pub fn remove(&self, name: &str) -> bool {
        let key = key_of(name);
        let mut registry = self.registry.write();
        registry.singletons.remove(&key);
        registry.entries.remove(&key).is_some()
    }

    /// Drop cached singleton instances; registrations stay
    pub fn clear_singletons(&self) {
        self.registry.write().singletons.clear();
    }

    /// Remove every registration except the injector itself
    pub fn clear(&self) {
        {
            let mut registry = self.registry.write();
            registry.entries.clear();
            registry.singletons.clear();
        }
        self.provide_self();
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.registry.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().entries.is_empty()
    }

    /// Check if two handles share a registry
    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("modules", &self.names())
            .finish()
    }
}
