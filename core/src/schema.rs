//! Shallow shape checks applied to imported trees.
//!
//! Only the top level is inspected: a required section must be present and
//! hold something (not null, false, zero or empty text). What it holds is
//! never looked at.

use crate::error::SchemaError;
use crate::tree::TreeValue;


/// Decides whether a parsed tree is acceptable as a whole-tree replacement.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, tree: &TreeValue) -> Result<(), SchemaError>;
}


/// The root must be a record in which every listed section is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredSections {
    sections: Vec<String>,
}

impl RequiredSections {
    pub fn new<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RequiredSections {
            sections: sections.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }
}

impl SchemaValidator for RequiredSections {
    fn validate(&self, tree: &TreeValue) -> Result<(), SchemaError> {
        let record = tree.as_record().ok_or(SchemaError::NotARecord(tree.kind()))?;
        let missing: Vec<String> = self
            .sections
            .iter()
            .filter(|s| !record.get(s.as_str()).is_some_and(is_set))
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::MissingSections(missing))
        }
    }
}


/// Null, `false`, zero (or NaN) and empty text count as unset.
fn is_set(value: &TreeValue) -> bool {
    match value {
        TreeValue::Null => false,
        TreeValue::Flag(b) => *b,
        TreeValue::Number(n) => *n != 0.0 && !n.is_nan(),
        TreeValue::Text(s) => !s.is_empty(),
        TreeValue::Record(_) | TreeValue::Sequence(_) => true,
    }
}


/// Any record is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnyRecord;

impl SchemaValidator for AnyRecord {
    fn validate(&self, tree: &TreeValue) -> Result<(), SchemaError> {
        match tree {
            TreeValue::Record(_) => Ok(()),
            other => Err(SchemaError::NotARecord(other.kind())),
        }
    }
}
