use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chrom_list::ChromList;
pub use crate::int_range::IntRange;

/// The structure represents a contiguous region of the genome on a single chromosome
#[derive(Clone, Copy, Deserialize, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize)]
pub struct GenomeSegment {
    /// chrom_index is defined by the indexing scheme of the run's chromosome list
    pub chrom_index: usize,
    pub range: IntRange,
}

impl GenomeSegment {
    pub fn new(chrom_index: usize, start: i64, end: i64) -> Self {
        Self {
            chrom_index,
            range: IntRange::from_pair(start, end),
        }
    }

    /// Convert to a string in 'samtools' region format (e.g. chr20:100-200)
    ///
    pub fn to_region_str(&self, chrom_list: &ChromList) -> String {
        let chrom = chrom_list.label(self.chrom_index);
        format!("{chrom}:{}-{}", self.range.start + 1, self.range.end)
    }
}

impl fmt::Debug for GenomeSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Segment: {}:{:?}", self.chrom_index, self.range)
    }
}

/// Returns None if on different chromosomes, otherwise the absolute distance between the
/// segment centers
///
pub fn get_segment_center_distance(gs1: &GenomeSegment, gs2: &GenomeSegment) -> Option<i64> {
    if gs1.chrom_index != gs2.chrom_index {
        None
    } else {
        Some((gs1.range.center() - gs2.range.center()).abs())
    }
}
