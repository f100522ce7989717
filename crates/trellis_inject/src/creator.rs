//! Creators and resolved dependencies

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::{InjectError, InjectResult};

/// A constructed module
pub type Module = Arc<dyn Any + Send + Sync>;

/// Factory invoked with positionally resolved dependencies
pub type Factory = Arc<dyn Fn(Dependencies) -> InjectResult<Module> + Send + Sync>;

/// How a module is produced
#[derive(Clone)]
pub enum Creator {
    /// Ready-made value, returned as-is
    Value(Module),
    /// Factory tagged with ordered dependency names
    Factory {
        dependencies: Vec<String>,
        factory: Factory,
    },
}

impl Creator {
    /// Wrap a plain value
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Self::Value(Arc::new(value))
    }

    /// Dependency-free factory
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::Factory {
            dependencies: Vec::new(),
            factory: Arc::new(move |_: Dependencies| -> InjectResult<Module> {
                Ok(Arc::new(factory()) as Module)
            }),
        }
    }

    /// Factory with named dependencies
    pub fn with_dependencies<I, S, T, F>(dependencies: I, factory: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        T: Any + Send + Sync,
        F: Fn(Dependencies) -> InjectResult<T> + Send + Sync + 'static,
    {
        Self::Factory {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            factory: Arc::new(move |deps: Dependencies| -> InjectResult<Module> {
                factory(deps).map(|value| Arc::new(value) as Module)
            }),
        }
    }

    /// Declared dependency names (empty for values)
    pub fn dependencies(&self) -> &[String] {
        match self {
            Creator::Value(_) => &[],
            Creator::Factory { dependencies, .. } => dependencies,
        }
    }

    /// Check if this creator is a factory
    pub fn is_factory(&self) -> bool {
        matches!(self, Creator::Factory { .. })
    }
}

impl fmt::Debug for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Creator::Value(_) => f.write_str("Creator::Value"),
            Creator::Factory { dependencies, .. } => f
                .debug_struct("Creator::Factory")
                .field("dependencies", dependencies)
                .finish(),
        }
    }
}

/// What to resolve: a registered name or an inline creator
#[derive(Debug, Clone)]
pub enum Target {
    Name(String),
    Creator(Creator),
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Creator> for Target {
    fn from(creator: Creator) -> Self {
        Self::Creator(creator)
    }
}

/// Resolved dependencies, in declaration order
pub struct Dependencies {
    owner: String,
    modules: Vec<Module>,
}

impl Dependencies {
    pub(crate) fn new(owner: impl Into<String>, modules: Vec<Module>) -> Self {
        Self {
            owner: owner.into(),
            modules,
        }
    }

    /// Name of the module being constructed
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Untyped dependency at `index`
    pub fn module(&self, index: usize) -> InjectResult<Module> {
        self.modules
            .get(index)
            .cloned()
            .ok_or_else(|| InjectError::MissingArgument {
                name: self.owner.clone(),
                index,
                len: self.modules.len(),
            })
    }

    /// Typed dependency at `index`
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> InjectResult<Arc<T>> {
        self.module(index)?
            .downcast::<T>()
            .map_err(|_| InjectError::TypeMismatch {
                name: format!("{}#{}", self.owner, index),
                expected: type_name::<T>(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
