//! Evidence clusters and the arena that owns them
//!

use serde::{Deserialize, Serialize};

use super::partition::{EvidenceIndex, PositionedEvidence};
use crate::evidence::{EvidenceSignature, SvType};
use crate::genome_segment::GenomeSegment;

/// Stable handle to a cluster in the cluster arena
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ClusterId(pub usize);

/// The evidence axis a cluster was built on
///
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ClusterRole {
    /// Built from the primary interval of each signature in the cluster stage
    Signature,

    /// Built from the source locus of two-sided signatures in the combine stage
    Source,

    /// Built from the destination locus of two-sided signatures in the combine stage
    Destination,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvidenceCluster {
    pub sv_type: SvType,
    pub role: ClusterRole,

    /// Evidence store indexes of all members, sorted
    pub members: Vec<EvidenceIndex>,

    /// Consensus locus of the cluster, see [get_representative_segment]
    pub representative: GenomeSegment,

    pub mean_mapq: f64,
}

impl EvidenceCluster {
    /// Build a cluster from a non-empty set of positioned members of one type
    ///
    pub fn from_members(
        evidence: &[EvidenceSignature],
        sv_type: SvType,
        role: ClusterRole,
        members: &[PositionedEvidence],
    ) -> Self {
        assert!(!members.is_empty());
        let segments = members.iter().map(|x| x.segment).collect::<Vec<_>>();
        let representative = get_representative_segment(&segments);
        let mut member_indexes = members.iter().map(|x| x.evidence_index).collect::<Vec<_>>();
        member_indexes.sort_unstable();
        let mapq_sum = member_indexes
            .iter()
            .map(|&x| evidence[x].mapq as f64)
            .sum::<f64>();
        Self {
            sv_type,
            role,
            mean_mapq: mapq_sum / member_indexes.len() as f64,
            members: member_indexes,
            representative,
        }
    }

    pub fn support(&self) -> usize {
        self.members.len()
    }

    /// Key used to put clusters in a deterministic genomic order
    pub fn sort_key(&self) -> (GenomeSegment, SvType, ClusterRole, EvidenceIndex) {
        (self.representative, self.sv_type, self.role, self.members[0])
    }
}

fn lower_median(sorted_values: &[i64]) -> i64 {
    let len = sorted_values.len();
    if len % 2 == 1 {
        sorted_values[len / 2]
    } else {
        (sorted_values[len / 2 - 1] + sorted_values[len / 2]).div_euclid(2)
    }
}

/// Get the consensus locus of a set of member loci
///
/// The result is the median member start and median member end, using the floor of the mean of
/// the two central values for an even member count. Because every member satisfies
/// start <= end, the median start never exceeds the median end, and both lie within the span of
/// the member loci.
///
/// All segments must be on the same chromosome.
///
pub fn get_representative_segment(segments: &[GenomeSegment]) -> GenomeSegment {
    assert!(!segments.is_empty());
    let chrom_index = segments[0].chrom_index;
    assert!(segments.iter().all(|x| x.chrom_index == chrom_index));

    let mut starts = segments.iter().map(|x| x.range.start).collect::<Vec<_>>();
    let mut ends = segments.iter().map(|x| x.range.end).collect::<Vec<_>>();
    starts.sort_unstable();
    ends.sort_unstable();
    GenomeSegment::new(chrom_index, lower_median(&starts), lower_median(&ends))
}

/// Sort clusters into deterministic genomic order
pub fn sort_clusters(clusters: &mut [EvidenceCluster]) {
    clusters.sort_by_key(|x| x.sort_key());
}

/// Owner of all evidence clusters produced in one run
///
/// Clusters are only appended, so every [ClusterId] stays valid for the life of the arena.
///
#[derive(Default, Deserialize, Serialize)]
pub struct ClusterArena {
    clusters: Vec<EvidenceCluster>,
}

impl ClusterArena {
    pub fn push(&mut self, cluster: EvidenceCluster) -> ClusterId {
        self.clusters.push(cluster);
        ClusterId(self.clusters.len() - 1)
    }

    /// Append clusters in the given order and return their new ids
    pub fn extend(&mut self, clusters: Vec<EvidenceCluster>) -> Vec<ClusterId> {
        clusters.into_iter().map(|x| self.push(x)).collect()
    }

    pub fn get(&self, id: ClusterId) -> &EvidenceCluster {
        &self.clusters[id.0]
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClusterId, &EvidenceCluster)> {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, x)| (ClusterId(i), x))
    }

    /// Ids of all clusters with the given type and role, in arena order
    pub fn ids_with(&self, sv_type: SvType, role: ClusterRole) -> Vec<ClusterId> {
        self.iter()
            .filter(|(_, x)| x.sv_type == sv_type && x.role == role)
            .map(|(id, _)| id)
            .collect()
    }
}
