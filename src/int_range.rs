use std::fmt;

use serde::{Deserialize, Serialize};

/// A simple type for integer ranges
///
/// All ranges follow the bed file range convention: 0-indexed, half-closed, [start,end)
///
/// Evidence intervals may be empty (start == end), which is how a single breakend position
/// without any uncertainty range is represented on input.
///
#[derive(Clone, Copy, Default, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub struct IntRange {
    pub start: i64,
    pub end: i64,
}

impl IntRange {
    pub fn from_pair(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn size(&self) -> i64 {
        self.end - self.start
    }

    pub fn center(&self) -> i64 {
        (self.start + self.end) / 2
    }

    /// Size of the intersection of the two ranges, 0 if they don't intersect
    pub fn overlap_size(&self, other: &IntRange) -> i64 {
        let start = std::cmp::max(self.start, other.start);
        let end = std::cmp::min(self.end, other.end);
        std::cmp::max(end - start, 0)
    }

    pub fn merge(&mut self, other: &IntRange) {
        if other.start < self.start {
            self.start = other.start;
        }
        if other.end > self.end {
            self.end = other.end;
        }
    }

    /// Size of the smallest range containing both ranges
    pub fn union_size(&self, other: &IntRange) -> i64 {
        let mut x = *self;
        x.merge(other);
        x.size()
    }
}

impl fmt::Debug for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_union_size() {
        let r1 = IntRange::from_pair(100, 200);
        let r2 = IntRange::from_pair(150, 300);
        let r3 = IntRange::from_pair(400, 400);

        assert_eq!(r1.overlap_size(&r2), 50);
        assert_eq!(r2.overlap_size(&r1), 50);
        assert_eq!(r1.overlap_size(&r3), 0);
        assert_eq!(r1.union_size(&r2), 200);
        assert_eq!(r1.union_size(&r3), 300);
    }

    #[test]
    fn test_empty_range() {
        let r = IntRange::from_pair(5000, 5000);
        assert_eq!(r.size(), 0);
        assert_eq!(r.center(), 5000);
        assert_eq!(r.overlap_size(&IntRange::from_pair(4000, 6000)), 0);
        assert_eq!(r.union_size(&IntRange::from_pair(4000, 4500)), 1000);
    }
}
