//! Dashdeck core: a path-addressed dashboard data store.
//!
//! One [`DataStore`] owns the dashboard tree. Views read values by dotted
//! path and write through the store, which tracks revisions, notifies
//! subscribers and handles save, export, import and reset.
//!
//! # Modules
//!
//! - [`tree`]: typed tree values and path get/set
//! - [`persist`]: key-value snapshots and JSON file export/import
//! - [`schema`]: shallow top-level checks for imported trees
//! - [`variant`]: the shipped dashboards and their default trees
//! - [`store`]: the data store
//! - [`config`]: settings file and config directory
//! - [`error`]: error types and `Outcome`

pub mod config;
pub mod error;
pub mod persist;
pub mod schema;
pub mod store;
pub mod tree;
pub mod variant;

pub use error::{Outcome, PathError, StoreError, ValidationError};
pub use store::{Change, ChangeEvent, DataStore, SubscriptionId};
pub use tree::{DataPath, TreeValue};
pub use variant::{Profile, Variant};
