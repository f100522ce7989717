//! # trellis_dataview - Data-View Query Pipeline
//!
//! A chainable [`DataView`] accumulates query options and loads them through a
//! [`DataProvider`]:
//! - [`MemoryProvider`] filters, sorts, groups and pages a local collection
//! - [`RemoteProvider`] turns the options into an OData-style query string and
//!   unwraps the server's response envelope
//! - [`Sorter`] implements the shared `"name, age desc"` sort definitions
//!
//! ## Usage
//!
//! ```ignore
//! let mut view = DataView::memory(items);
//! view.page(2).page_size(5).order_by("name");
//! view.load().await?;
//!
//! assert_eq!(view.page_count(), 5);
//! ```

pub mod error;
pub mod memory;
pub mod options;
pub mod provider;
pub mod record;
pub mod remote;
pub mod result;
pub mod sorter;
pub mod transport;
pub mod view;

pub use error::{DataViewError, DataViewResult};
pub use memory::MemoryProvider;
pub use options::{Filter, LoadOptions};
pub use provider::DataProvider;
pub use record::{compare_values, Record};
pub use remote::RemoteProvider;
pub use result::{Group, LoadResult, Loaded};
pub use sorter::{SortDirection, Sorter};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{TrackedTransport, Transport, TransportError, TransportResult};
pub use view::{DataView, LOADED};

pub mod prelude {
    pub use crate::error::{DataViewError, DataViewResult};
    pub use crate::memory::MemoryProvider;
    pub use crate::options::{Filter, LoadOptions};
    pub use crate::provider::DataProvider;
    pub use crate::record::Record;
    pub use crate::remote::RemoteProvider;
    pub use crate::result::{Group, LoadResult, Loaded};
    pub use crate::sorter::{SortDirection, Sorter};
    pub use crate::transport::{TrackedTransport, Transport};
    pub use crate::view::DataView;
}
