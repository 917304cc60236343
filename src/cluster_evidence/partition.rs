//! Coarse partitioning of positioned evidence
//!
//! Partitions bound the cost of the pairwise clustering step. Evidence in different partitions
//! is guaranteed to be separated by more than the partition distance, so no cluster can span
//! two partitions.
//!

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::genome_segment::GenomeSegment;

/// Index of a signature in the evidence store
pub type EvidenceIndex = usize;

/// A single evidence signature reduced to the locus used on one clustering axis
///
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct PositionedEvidence {
    pub segment: GenomeSegment,
    pub evidence_index: EvidenceIndex,
}

/// Selects which end of the preceding evidence the partition gap is measured from
///
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ValueEnum)]
pub enum PartitionGapMode {
    /// Measure from the furthest end of any evidence already in the partition
    #[default]
    End,

    /// Measure from the start of the preceding evidence
    Start,
}

/// Split evidence into disjoint partitions with a single left-to-right sweep
///
/// Evidence is sorted by locus, and a new partition is started whenever the next start is more
/// than `max_distance` beyond the running partition reach, or the chromosome changes. In the
/// default `End` mode the reach is the maximum end observed in the partition, which guarantees
/// that evidence in separate partitions is more than `max_distance` apart.
///
/// Partitions are returned in genomic order, each sorted by locus.
///
pub fn partition_evidence(
    mut evidence: Vec<PositionedEvidence>,
    max_distance: i64,
    gap_mode: PartitionGapMode,
) -> Vec<Vec<PositionedEvidence>> {
    evidence.sort();

    let anchor = |x: &PositionedEvidence| match gap_mode {
        PartitionGapMode::End => x.segment.range.end,
        PartitionGapMode::Start => x.segment.range.start,
    };

    let mut partitions = Vec::new();
    let mut current_partition: Vec<PositionedEvidence> = Vec::new();
    let mut reach = 0;
    for pe in evidence {
        if let Some(last) = current_partition.last() {
            let is_new_partition = last.segment.chrom_index != pe.segment.chrom_index
                || pe.segment.range.start - reach > max_distance;
            if is_new_partition {
                partitions.push(std::mem::take(&mut current_partition));
            }
        }
        reach = if current_partition.is_empty() {
            anchor(&pe)
        } else {
            std::cmp::max(reach, anchor(&pe))
        };
        current_partition.push(pe);
    }
    if !current_partition.is_empty() {
        partitions.push(current_partition);
    }
    partitions
}
