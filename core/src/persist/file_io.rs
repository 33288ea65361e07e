//! File export and background file import.
//!
//! Export writes pretty-printed JSON named `<prefix>-<YYYY-MM-DD>.json`.
//! Import checks the extension up front, then reads and parses the file
//! on a worker thread so the caller's loop stays responsive.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use chrono::NaiveDate;

use crate::error::{ImportError, StorageError};
use crate::tree::TreeValue;


// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// `<prefix>-<YYYY-MM-DD>.json`
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

/// Write `tree` as pretty JSON into `dir`, returning the file written.
///
/// An export from the same day overwrites the earlier one.
pub fn export_to_file(
    tree: &TreeValue,
    dir: &Path,
    prefix: &str,
    date: NaiveDate,
) -> Result<PathBuf, StorageError> {
    let text =
        serde_json::to_string_pretty(tree).map_err(|e| StorageError::Serialize(e.to_string()))?;
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(prefix, date));
    fs::write(&path, text)?;
    Ok(path)
}


// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Reject anything whose extension is not `.json` before reading it.
pub fn check_json_file(path: &Path) -> Result<(), ImportError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        Ok(())
    } else {
        Err(ImportError::NotJson(path.to_path_buf()))
    }
}

/// Read and parse `path` synchronously.
pub fn read_tree(path: &Path) -> Result<TreeValue, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Start reading `path` on a worker thread.
///
/// The extension check happens here, synchronously; everything after it
/// is reported through the returned handle.
pub fn import_from_file(path: &Path) -> Result<ImportHandle, ImportError> {
    check_json_file(path)?;

    let (tx, rx) = mpsc::channel();
    let worker_path = path.to_path_buf();
    thread::Builder::new()
        .name("dashdeck-import".into())
        .spawn(move || {
            // The receiver may already be gone; nothing to report to then.
            let _ = tx.send(read_tree(&worker_path));
        })
        .map_err(|source| ImportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(ImportHandle {
        path: path.to_path_buf(),
        rx,
    })
}


/// A pending file import.
#[derive(Debug)]
pub struct ImportHandle {
    path: PathBuf,
    rx: Receiver<Result<TreeValue, ImportError>>,
}

impl ImportHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check. `None` while the worker is still reading.
    pub fn try_result(&self) -> Option<Result<TreeValue, ImportError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ImportError::WorkerLost)),
        }
    }

    /// Block until the worker reports.
    pub fn wait(self) -> Result<TreeValue, ImportError> {
        self.rx.recv().unwrap_or(Err(ImportError::WorkerLost))
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
