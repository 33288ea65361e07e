//! The data store: single owner and mutation gateway for the dashboard tree.
//!
//! Reads go through [`DataStore::get`] and friends. Every write goes through
//! [`DataStore::update`], an import, or [`DataStore::reset`], and each one
//! bumps the revision and notifies subscribers. Nothing is persisted
//! implicitly except a successful import; saving is an explicit action.
//!
//! Management operations (save, export, import, reset) never return an
//! error to the caller. Failures are folded into an [`Outcome`] carrying the
//! message the view shows in its banner.

use std::fmt;
use std::path::Path;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{ImportError, Outcome, StoreError};
use crate::persist::{self, ImportHandle, KeyValueStore};
use crate::tree::{self, DataPath, TreeValue};
use crate::variant::Profile;


pub const SAVED: &str = "Data saved successfully!";
pub const EXPORTED: &str = "Data exported successfully!";
pub const IMPORTED: &str = "Data imported successfully!";
pub const RESET: &str = "Data reset to default values!";
pub const INVALID_FORMAT: &str = "Invalid data format. Please check your JSON file.";
pub const NOT_JSON: &str = "Please select a valid JSON file.";
pub const IMPORT_PENDING: &str = "An import is already in progress.";


// ---------------------------------------------------------------------------
// Change notification
// ---------------------------------------------------------------------------

/// What kind of write happened.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Updated { path: DataPath },
    Imported,
    Reset,
}

/// Delivered to every subscriber after a write.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub change: Change,
    /// Store revision after the write.
    pub revision: u64,
    /// False when the write stored a value equal to what was there.
    pub changed: bool,
}

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&ChangeEvent)>;


// ---------------------------------------------------------------------------
// DataStore
// ---------------------------------------------------------------------------

pub struct DataStore {
    profile: Profile,
    backend: Box<dyn KeyValueStore>,
    tree: TreeValue,
    revision: u64,
    import: Option<ImportHandle>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl DataStore {
    /// Build a store for `profile`, starting from the snapshot saved in
    /// `backend` when there is one and from the profile defaults otherwise.
    ///
    /// An unreadable or corrupt snapshot is logged and ignored.
    pub fn open(profile: Profile, backend: impl KeyValueStore + 'static) -> Self {
        let tree = match persist::load_snapshot(&backend, profile.storage_key()) {
            Ok(Some(tree)) => {
                info!(key = profile.storage_key(), "loaded saved snapshot");
                tree
            }
            Ok(None) => {
                debug!(key = profile.storage_key(), "no saved snapshot; using defaults");
                profile.defaults().clone()
            }
            Err(e) => {
                warn!(key = profile.storage_key(), error = %e, "ignoring saved snapshot; using defaults");
                profile.defaults().clone()
            }
        };
        Self::with_tree(profile, backend, tree)
    }

    /// Build a store around `tree` without reading `backend`.
    pub fn with_tree(profile: Profile, backend: impl KeyValueStore + 'static, tree: TreeValue) -> Self {
        DataStore {
            profile,
            backend: Box::new(backend),
            tree,
            revision: 0,
            import: None,
            listeners: Vec::new(),
            next_subscription: 1,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn tree(&self) -> &TreeValue {
        &self.tree
    }

    /// Number of writes applied since the store was built.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while a file import is in flight.
    pub fn is_busy(&self) -> bool {
        self.import.is_some()
    }

    // -- reads --------------------------------------------------------------

    /// The value at `path`, or `None` if nothing is there.
    pub fn lookup(&self, path: &DataPath) -> Option<&TreeValue> {
        tree::get(&self.tree, path)
    }

    /// The value at `path`, or `fallback` when the path is absent.
    ///
    /// A malformed path is treated as absent and logged.
    pub fn get(&self, path: &str, fallback: impl Into<TreeValue>) -> TreeValue {
        match DataPath::parse(path) {
            Ok(parsed) => match self.lookup(&parsed) {
                Some(value) => value.clone(),
                None => fallback.into(),
            },
            Err(e) => {
                warn!(path, error = %e, "malformed path read; using fallback");
                fallback.into()
            }
        }
    }

    /// The number at `path`, or `fallback` if the path is absent or not a number.
    pub fn number(&self, path: &str, fallback: f64) -> f64 {
        self.get(path, TreeValue::Null).as_f64().unwrap_or(fallback)
    }

    /// The text at `path`. Numbers are rendered; anything else yields `fallback`.
    pub fn text(&self, path: &str, fallback: &str) -> String {
        match self.get(path, TreeValue::Null) {
            TreeValue::Text(s) => s,
            n @ TreeValue::Number(_) => n.display_string(),
            _ => fallback.to_string(),
        }
    }

    // -- writes -------------------------------------------------------------

    /// Store `value` at `path`.
    ///
    /// Rejected while an import is in flight. Not persisted.
    pub fn update(&mut self, path: &str, value: impl Into<TreeValue>) -> Result<(), StoreError> {
        let parsed = DataPath::parse(path)?;
        self.update_at(&parsed, value.into())
    }

    /// [`update`](Self::update) with an already parsed path.
    pub fn update_at(&mut self, path: &DataPath, value: TreeValue) -> Result<(), StoreError> {
        if self.is_busy() {
            warn!(%path, "update rejected while import is in flight");
            return Err(StoreError::ImportInFlight);
        }
        let changed = tree::get(&self.tree, path) != Some(&value);
        self.tree = tree::set(&self.tree, path, value)?;
        self.revision += 1;
        debug!(%path, revision = self.revision, changed, "updated");
        self.notify(Change::Updated { path: path.clone() }, changed);
        Ok(())
    }

    /// Persist the current tree under the profile key.
    pub fn save(&mut self) -> Outcome {
        match persist::save_snapshot(self.backend.as_mut(), self.profile.storage_key(), &self.tree) {
            Ok(()) => {
                info!(key = self.profile.storage_key(), revision = self.revision, "saved");
                Outcome::ok(SAVED)
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                Outcome::failed(format!("Error saving data: {}", e))
            }
        }
    }

    /// Write the current tree to `<dir>/<prefix>-<today>.json`.
    pub fn export_json(&self, dir: &Path) -> Outcome {
        self.export_json_on(dir, Local::now().date_naive())
    }

    /// [`export_json`](Self::export_json) with an explicit date.
    pub fn export_json_on(&self, dir: &Path, date: NaiveDate) -> Outcome {
        match persist::export_to_file(&self.tree, dir, self.profile.export_prefix(), date) {
            Ok(file) => {
                info!(file = %file.display(), "exported");
                Outcome::ok(EXPORTED)
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "export failed");
                Outcome::failed(format!("Error exporting data: {}", e))
            }
        }
    }

    /// Replace the tree with the profile defaults and drop the saved snapshot.
    pub fn reset(&mut self) -> Outcome {
        if self.is_busy() {
            return Outcome::failed(IMPORT_PENDING);
        }
        let defaults = self.profile.defaults().clone();
        self.replace_tree(defaults, Change::Reset);
        info!(revision = self.revision, "reset to defaults");
        match persist::clear_snapshot(self.backend.as_mut(), self.profile.storage_key()) {
            Ok(()) => Outcome::ok(RESET),
            Err(e) => {
                warn!(error = %e, "could not remove saved snapshot");
                Outcome::failed(format!("Data reset, but the saved copy could not be removed: {}", e))
            }
        }
    }

    // -- import -------------------------------------------------------------

    /// Start importing `path` in the background.
    ///
    /// Fails immediately when another import is in flight or the file is not
    /// JSON. Otherwise the store is busy until [`poll_import`](Self::poll_import)
    /// reports the result.
    pub fn begin_import(&mut self, path: &Path) -> Result<(), Outcome> {
        if self.is_busy() {
            return Err(Outcome::failed(IMPORT_PENDING));
        }
        match persist::import_from_file(path) {
            Ok(handle) => {
                info!(file = %path.display(), "import started");
                self.import = Some(handle);
                Ok(())
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "import refused");
                Err(import_failure(&e))
            }
        }
    }

    /// Non-blocking. Returns the outcome once the background read finishes.
    pub fn poll_import(&mut self) -> Option<Outcome> {
        let result = self.import.as_ref()?.try_result()?;
        self.import = None;
        Some(self.finish_import(result))
    }

    /// Import `path` and wait for the result.
    pub fn import_json(&mut self, path: &Path) -> Outcome {
        if let Err(outcome) = self.begin_import(path) {
            return outcome;
        }
        let result = match self.import.take() {
            Some(handle) => handle.wait(),
            None => Err(ImportError::WorkerLost),
        };
        self.finish_import(result)
    }

    fn finish_import(&mut self, result: Result<TreeValue, ImportError>) -> Outcome {
        let validated = result.and_then(|tree| {
            self.profile.validator().validate(&tree)?;
            Ok(tree)
        });
        let tree = match validated {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "import rejected; tree unchanged");
                return import_failure(&e);
            }
        };

        self.replace_tree(tree, Change::Imported);
        info!(revision = self.revision, "imported");
        match persist::save_snapshot(self.backend.as_mut(), self.profile.storage_key(), &self.tree) {
            Ok(()) => Outcome::ok(IMPORTED),
            Err(e) => {
                warn!(error = %e, "imported tree could not be saved");
                Outcome::failed(format!("Data imported, but saving it failed: {}", e))
            }
        }
    }

    fn replace_tree(&mut self, tree: TreeValue, change: Change) {
        let changed = self.tree != tree;
        self.tree = tree;
        self.revision += 1;
        self.notify(change, changed);
    }

    // -- subscriptions ------------------------------------------------------

    /// Call `listener` after every write until unsubscribed.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: Change, changed: bool) {
        let event = ChangeEvent {
            change,
            revision: self.revision,
            changed,
        };
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl fmt::Debug for DataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStore")
            .field("profile", &self.profile)
            .field("revision", &self.revision)
            .field("busy", &self.is_busy())
            .field("subscribers", &self.listeners.len())
            .finish_non_exhaustive()
    }
}


fn import_failure(e: &ImportError) -> Outcome {
    match e {
        ImportError::NotJson(_) => Outcome::failed(NOT_JSON),
        ImportError::Parse { message, .. } => {
            Outcome::failed(format!("Error parsing JSON file: {}", message))
        }
        ImportError::Schema(_) => Outcome::failed(INVALID_FORMAT),
        ImportError::Read { .. } | ImportError::WorkerLost => {
            Outcome::failed(format!("Error reading file: {}", e))
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
