//! Framework errors

use thiserror::Error;
use trellis_dataview::DataViewError;
use trellis_inject::InjectError;
use trellis_regions::RegionError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    DataView(#[from] DataViewError),
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;
