//! View-model and renderer contracts

use futures_util::future::BoxFuture;
use trellis_core::Params;

/// Future a view-model returns from `before_show` to delay rendering
pub type Deferred = BoxFuture<'static, ()>;

/// Optional lifecycle hooks a view-model exposes
///
/// The engine only calls a hook whose flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub show: bool,
    pub after_show: bool,
    pub hide: bool,
    pub destroy: bool,
}

impl Capabilities {
    /// No optional hooks
    pub const NONE: Self = Self {
        show: false,
        after_show: false,
        hide: false,
        destroy: false,
    };

    /// Every optional hook
    pub const ALL: Self = Self {
        show: true,
        after_show: true,
        hide: true,
        destroy: true,
    };

    pub fn with_show(mut self) -> Self {
        self.show = true;
        self
    }

    pub fn with_after_show(mut self) -> Self {
        self.after_show = true;
        self
    }

    pub fn with_hide(mut self) -> Self {
        self.hide = true;
        self
    }

    pub fn with_destroy(mut self) -> Self {
        self.destroy = true;
        self
    }
}

/// A data/behavior object rendered into a region
pub trait ViewModel: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Template the renderer binds this view-model to
    fn template(&self) -> &str {
        self.name()
    }

    /// Which optional hooks this view-model implements
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Called before rendering; a returned future delays rendering until it completes
    fn before_show(&self, _params: &Params) -> Option<Deferred> {
        None
    }

    /// Called once in-flight operations settle and the template has rendered
    fn show(&self, _params: &Params) {}

    /// Called after `show`
    fn after_show(&self) {}

    /// Called when another view-model replaces this one
    fn hide(&self) {}

    /// Called when the owning part is destroyed
    fn destroy(&self) {}
}

/// Templating engine boundary
pub trait Renderer: Send + Sync {
    /// Render `view_model` into `region`
    fn render(&self, region: &str, view_model: &dyn ViewModel) -> Result<(), String>;
}
