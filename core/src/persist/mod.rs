//! Persistence adapter: durable snapshots plus file export/import.

pub mod file_io;
pub mod kv;
pub mod snapshot;

pub use file_io::{check_json_file, export_file_name, export_to_file, import_from_file, ImportHandle};
pub use kv::{DirStore, KeyValueStore, MemoryStore};
pub use snapshot::{clear_snapshot, load_snapshot, save_snapshot};
