use serde::{Deserialize, Serialize};

use crate::cluster_evidence::{ClusterArena, ClusterId};
use crate::evidence::SvType;
use crate::genome_segment::GenomeSegment;
use crate::globals::PROGRAM_NAME;

/// Resolution state of a combined call
///
/// Single-sided types are always complete. Two-sided types are complete only when a source
/// cluster was paired with a destination cluster. An incomplete call still carries every side
/// cluster of its evidence, but only its source locus is reported.
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum CallCompleteness {
    Complete,
    Incomplete,
}

/// A final classified structural variant call
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CombinedCall {
    /// Unique label assigned once the full call set is sorted
    pub id: String,

    pub final_type: SvType,

    /// Handles to the clusters merged into this call. The first cluster is the one the call
    /// locus was taken from.
    pub contributing_clusters: Vec<ClusterId>,

    pub locus: GenomeSegment,

    /// Destination locus of a complete two-sided call
    pub partner_locus: Option<GenomeSegment>,

    pub completeness: CallCompleteness,

    pub total_support: usize,
}

impl CombinedCall {
    /// Create a call from one or more clusters, taking the locus from the first
    pub fn from_clusters(
        arena: &ClusterArena,
        final_type: SvType,
        contributing_clusters: Vec<ClusterId>,
        partner_locus: Option<GenomeSegment>,
        completeness: CallCompleteness,
    ) -> Self {
        assert!(!contributing_clusters.is_empty());
        let locus = arena.get(contributing_clusters[0]).representative;
        let total_support = contributing_clusters
            .iter()
            .map(|&x| arena.get(x).support())
            .sum();
        Self {
            id: String::new(),
            final_type,
            contributing_clusters,
            locus,
            partner_locus,
            completeness,
            total_support,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completeness == CallCompleteness::Complete
    }

    fn sort_key(&self) -> (GenomeSegment, SvType, CallCompleteness, &[ClusterId]) {
        (
            self.locus,
            self.final_type,
            self.completeness,
            &self.contributing_clusters,
        )
    }
}

/// The immutable result of the combine stage, sorted in genomic order
///
pub struct CallSet {
    pub arena: ClusterArena,
    pub calls: Vec<CombinedCall>,
}

impl CallSet {
    /// Sort calls into their final order and assign call ids
    pub fn new(arena: ClusterArena, mut calls: Vec<CombinedCall>) -> Self {
        calls.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut type_counts = std::collections::HashMap::new();
        for call in calls.iter_mut() {
            let count = type_counts.entry(call.final_type).or_insert(0usize);
            *count += 1;
            call.id = format!("{PROGRAM_NAME}.{}.{}", call.final_type.label(), count);
        }
        Self { arena, calls }
    }
}
