//! Dotted path parser.
//!
//! Parses paths like `page1.metrics.sellSide` or `topOffices.0.revenue`
//! into a list of segments. A segment made only of ASCII digits can also
//! index into a sequence.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;


/// A single segment within a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment(String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The sequence index this segment denotes, if it is all digits.
    pub fn index(&self) -> Option<usize> {
        if !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


/// A parsed, non-empty dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataPath {
    segments: Vec<Segment>,
}

impl DataPath {
    /// Parse a dotted string like `page1.metrics.sellSide`.
    ///
    /// Surrounding whitespace is ignored; every segment must be non-empty.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in input.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptySegment(input.to_string()));
            }
            segments.push(Segment(part.to_string()));
        }

        Ok(DataPath { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment.
    pub fn leaf(&self) -> &Segment {
        // Construction guarantees at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    /// The path without its final segment, or `None` for a single-segment path.
    pub fn parent(&self) -> Option<DataPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(DataPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Extend this path by one segment.
    pub fn child(&self, segment: &str) -> Result<DataPath, PathError> {
        if segment.is_empty() || segment.contains('.') {
            return Err(PathError::EmptySegment(format!("{}.{}", self, segment)));
        }
        let mut segments = self.segments.clone();
        segments.push(Segment(segment.to_string()));
        Ok(DataPath { segments })
    }

    /// The dotted form of the first `n` segments, used in error messages.
    pub fn prefix(&self, n: usize) -> String {
        self.segments[..n.min(self.segments.len())]
            .iter()
            .map(Segment::as_str)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Format back to a dotted string.
    pub fn to_dotted(&self) -> String {
        self.prefix(self.segments.len())
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl FromStr for DataPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataPath::parse(s)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- Parsing ---

    #[test]
    fn parse_nested_path() {
        let p = DataPath::parse("page1.metrics.sellSide").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.segments()[0].as_str(), "page1");
        assert_eq!(p.leaf().as_str(), "sellSide");
    }

    #[test]
    fn parse_single_segment() {
        let p = DataPath::parse("grossRevenue").unwrap();
        assert_eq!(p.len(), 1);
        assert!(p.parent().is_none());
    }

    #[test]
    fn parse_trims_whitespace() {
        let p = DataPath::parse("  kpi.marketShare ").unwrap();
        assert_eq!(p.to_dotted(), "kpi.marketShare");
    }

    #[test]
    fn numeric_segment_is_an_index() {
        let p = DataPath::parse("topOffices.2.revenue").unwrap();
        assert_eq!(p.segments()[1].index(), Some(2));
        assert_eq!(p.segments()[0].index(), None);
        assert_eq!(p.leaf().index(), None);
    }

    #[test]
    fn signed_segment_is_not_an_index() {
        let p = DataPath::parse("a.-1").unwrap();
        assert_eq!(p.leaf().index(), None);
    }

    // --- Parse errors ---

    #[test]
    fn parse_empty_path() {
        assert_eq!(DataPath::parse(""), Err(PathError::Empty));
        assert_eq!(DataPath::parse("   "), Err(PathError::Empty));
    }

    #[test]
    fn parse_empty_segment() {
        assert!(matches!(
            DataPath::parse("page1..sellSide"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(DataPath::parse(".page1"), Err(PathError::EmptySegment(_))));
        assert!(matches!(DataPath::parse("page1."), Err(PathError::EmptySegment(_))));
    }

    // --- Navigation ---

    #[test]
    fn parent_and_child() {
        let p = DataPath::parse("page2.revenue.total").unwrap();
        let parent = p.parent().unwrap();
        assert_eq!(parent.to_dotted(), "page2.revenue");
        assert_eq!(parent.child("total").unwrap(), p);
        assert!(parent.child("").is_err());
        assert!(parent.child("a.b").is_err());
    }

    #[test]
    fn prefix_clamps() {
        let p = DataPath::parse("a.b.c").unwrap();
        assert_eq!(p.prefix(2), "a.b");
        assert_eq!(p.prefix(10), "a.b.c");
    }

    // --- Formatting ---

    #[test]
    fn display_and_from_str_round_trip() {
        let p: DataPath = "page3.marketStatus.closed".parse().unwrap();
        assert_eq!(format!("{}", p), "page3.marketStatus.closed");
    }
}
