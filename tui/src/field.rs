//! Inline-editable fields bound to one path in the data store.
//!
//! A field is either displaying the store value or editing a draft. Commit
//! parses the draft (numbers only), runs the optional validator and writes
//! through [`DataStore::update_at`]. A draft that does not parse or does
//! not validate is dropped without touching the store and without a banner.

use std::fmt;
use std::sync::Arc;

use dashdeck_core::{DataPath, DataStore, PathError, StoreError, TreeValue, ValidationError};

use crate::format::NumberFormat;
use crate::input::InputLine;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// Accepts or rejects a parsed value before it is written.
pub type Validator = Arc<dyn Fn(&TreeValue) -> bool + Send + Sync>;

/// Result of [`EditableField::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// The draft was written to the store.
    Committed,
    /// The draft was dropped; the store is unchanged.
    Discarded(ValidationError),
    /// The field was not being edited.
    Idle,
}


#[derive(Debug, Clone)]
struct EditSession {
    original: String,
    draft: InputLine,
}


#[derive(Clone)]
pub struct EditableField {
    path: DataPath,
    label: String,
    kind: FieldKind,
    default: TreeValue,
    prefix: String,
    suffix: String,
    format: NumberFormat,
    validator: Option<Validator>,
    session: Option<EditSession>,
}

impl EditableField {
    pub fn new(path: &str, label: &str, kind: FieldKind) -> Result<Self, PathError> {
        Ok(Self::at(DataPath::parse(path)?, label, kind))
    }

    /// A field bound to an already parsed path.
    pub fn at(path: DataPath, label: &str, kind: FieldKind) -> Self {
        let default = match kind {
            FieldKind::Number => TreeValue::Number(0.0),
            FieldKind::Text => TreeValue::Text(String::new()),
        };
        EditableField {
            path,
            label: label.to_string(),
            kind,
            default,
            prefix: String::new(),
            suffix: String::new(),
            format: NumberFormat::Plain,
            validator: None,
            session: None,
        }
    }

    pub fn number(path: &str, label: &str) -> Result<Self, PathError> {
        Self::new(path, label, FieldKind::Number)
    }

    pub fn text(path: &str, label: &str) -> Result<Self, PathError> {
        Self::new(path, label, FieldKind::Text)
    }

    pub fn with_format(mut self, format: NumberFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = suffix.to_string();
        self
    }

    pub fn with_default(mut self, default: impl Into<TreeValue>) -> Self {
        self.default = default.into();
        self
    }

    pub fn with_validator(mut self, validator: impl Fn(&TreeValue) -> bool + Send + Sync + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn path(&self) -> &DataPath {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    /// The store value, or the field default when the path is absent.
    pub fn value(&self, store: &DataStore) -> TreeValue {
        store.lookup(&self.path).cloned().unwrap_or_else(|| self.default.clone())
    }

    /// Prefix, formatted value and suffix as shown when not editing.
    pub fn display_text(&self, store: &DataStore) -> String {
        let value = self.value(store);
        let body = match self.kind {
            FieldKind::Number => self.format.render(&value),
            FieldKind::Text => value.display_string(),
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }

    // -- editing ------------------------------------------------------------

    /// Start editing with the current value as the draft. No-op if already editing.
    pub fn activate(&mut self, store: &DataStore) {
        if self.session.is_some() {
            return;
        }
        let original = self.value(store).display_string();
        self.session = Some(EditSession {
            draft: InputLine::with_text(&original),
            original,
        });
    }

    pub fn draft(&self) -> Option<&InputLine> {
        self.session.as_ref().map(|s| &s.draft)
    }

    pub fn draft_mut(&mut self) -> Option<&mut InputLine> {
        self.session.as_mut().map(|s| &mut s.draft)
    }

    /// True when the draft differs from the value it was seeded with.
    pub fn is_modified(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.draft.text() != s.original)
            .unwrap_or(false)
    }

    /// Drop the draft unconditionally.
    pub fn cancel(&mut self) {
        self.session = None;
    }

    /// Parse, validate and write the draft; the field returns to display
    /// in every case.
    ///
    /// Only a path that no longer fits the tree (e.g. after an import
    /// replaced a section with a scalar) is returned as an error.
    pub fn commit(&mut self, store: &mut DataStore) -> Result<Commit, StoreError> {
        let Some(session) = self.session.take() else {
            return Ok(Commit::Idle);
        };
        let raw = session.draft.text();

        let value = match self.kind {
            FieldKind::Number => match parse_number(&raw) {
                Some(n) => TreeValue::Number(n),
                None => return Ok(Commit::Discarded(ValidationError::NotANumber(raw))),
            },
            FieldKind::Text => TreeValue::Text(raw),
        };

        if let Some(validator) = &self.validator {
            if !validator(&value) {
                return Ok(Commit::Discarded(ValidationError::Rejected));
            }
        }

        match store.update_at(&self.path, value) {
            Ok(()) => Ok(Commit::Committed),
            Err(StoreError::ImportInFlight) => Ok(Commit::Discarded(ValidationError::StoreBusy)),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for EditableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditableField")
            .field("path", &self.path)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("format", &self.format)
            .field("editing", &self.is_editing())
            .finish_non_exhaustive()
    }
}


/// A finite number from the trimmed draft, or `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
