//! The dashboard data tree.
//!
//! Provides dotted-path addressing (e.g. `page1.metrics.sellSide`), a typed
//! value union with copy-on-write containers, and pure get/set over it.

pub mod access;
pub mod path;
pub mod value;

pub use access::{get, set};
pub use path::{DataPath, Segment};
pub use value::{Record, TreeValue};
