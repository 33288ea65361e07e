//! Read and write values in a tree by path.
//!
//! `get` never fails: an absent segment, an out-of-range index, or a
//! scalar in the middle of the path all resolve to `None`. `set` copies on
//! write. The input tree is left untouched and every subtree off the
//! edited path stays shared with it.

use std::sync::Arc;

use crate::error::PathError;

use super::path::DataPath;
use super::value::TreeValue;


/// Resolve `path` inside `tree`.
pub fn get<'a>(tree: &'a TreeValue, path: &DataPath) -> Option<&'a TreeValue> {
    let mut current = tree;
    for segment in path.segments() {
        current = match current {
            TreeValue::Record(record) => record.get(segment.as_str())?,
            TreeValue::Sequence(items) => items.get(segment.index()?)?,
            _ => return None,
        };
    }
    Some(current)
}


/// Return a new tree equal to `tree` except that `path` now holds `value`.
///
/// Missing intermediate segments are created as empty records. Writing
/// through a scalar, or through a sequence with a non-index segment, is a
/// [`PathError`]. An index equal to a sequence's length appends.
pub fn set(tree: &TreeValue, path: &DataPath, value: TreeValue) -> Result<TreeValue, PathError> {
    let mut root = tree.clone();
    set_at(&mut root, path, 0, value)?;
    Ok(root)
}


fn set_at(
    node: &mut TreeValue,
    path: &DataPath,
    depth: usize,
    value: TreeValue,
) -> Result<(), PathError> {
    let segment = &path.segments()[depth];
    let is_leaf = depth + 1 == path.len();

    match node {
        TreeValue::Record(record) => {
            let record = Arc::make_mut(record);
            if is_leaf {
                record.insert(segment.as_str().to_string(), value);
                return Ok(());
            }
            let child = record
                .entry(segment.as_str().to_string())
                .or_insert_with(TreeValue::empty_record);
            set_at(child, path, depth + 1, value)
        }
        TreeValue::Sequence(items) => {
            let index = segment.index().ok_or_else(|| PathError::NotAnIndex {
                at: location(path, depth),
                segment: segment.as_str().to_string(),
            })?;
            let len = items.len();
            if index > len {
                return Err(PathError::IndexOutOfRange {
                    at: location(path, depth),
                    index,
                    len,
                });
            }
            let items = Arc::make_mut(items);
            if index == len {
                items.push(TreeValue::empty_record());
            }
            if is_leaf {
                items[index] = value;
                return Ok(());
            }
            set_at(&mut items[index], path, depth + 1, value)
        }
        scalar => Err(PathError::NotAContainer {
            at: location(path, depth),
            kind: scalar.kind(),
        }),
    }
}


/// Dotted location of the node at `depth`, with `<root>` for the top.
fn location(path: &DataPath, depth: usize) -> String {
    if depth == 0 {
        "<root>".to_string()
    } else {
        path.prefix(depth)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
