//! Pairing of source and destination clusters for two-sided evidence types
//!
//! Evidence for translocations and insertions with a detected origin carries two loci. The
//! loci on each side are clustered independently, and source clusters are then paired with the
//! destination cluster whose position agrees on both sides. Side clusters linked by shared
//! evidence always resolve into the same call.
//!

use std::collections::BTreeMap;

use super::combined_call::{CallCompleteness, CombinedCall};
use crate::cluster_evidence::{
    ClusterArena, ClusterId, ClusterRole, DistanceMetric, EvidenceCluster, EvidenceIndex,
    LinkageSettings, PartitionGapMode, PositionedEvidence, UnionFind,
    cluster_positioned_evidence, get_representative_segment,
};
use crate::config::CombineConfig;
use crate::evidence::{BreakendPair, EvidenceSignature, SvType};
use crate::genome_segment::GenomeSegment;
use crate::log_utils::debug_msg;
use crate::run_stats::CombineStats;

/// A source or destination cluster with the partner locus implied by its members
#[derive(Debug)]
struct SideCluster {
    id: ClusterId,
    locus: GenomeSegment,
    support: usize,

    /// Consensus of the members' loci on the other side
    expected_partner: GenomeSegment,
}

fn get_side_segment(pair: &BreakendPair, role: ClusterRole) -> &GenomeSegment {
    match role {
        ClusterRole::Source => &pair.source,
        ClusterRole::Destination => &pair.destination,
        ClusterRole::Signature => panic!("Signature clusters have no breakend side"),
    }
}

fn get_breakend_pair(sig: &EvidenceSignature) -> &BreakendPair {
    sig.evidence
        .breakend_pair()
        .expect("Two-sided evidence without a breakend pair")
}

/// Find the consensus partner locus of a side cluster
///
/// The partner chromosome is the one most common among the members, ties going to the lower
/// chromosome index, and the locus is the representative of member partner loci on that
/// chromosome.
///
fn get_expected_partner(
    evidence: &[EvidenceSignature],
    cluster: &EvidenceCluster,
    partner_role: ClusterRole,
) -> GenomeSegment {
    let mut chrom_segments: BTreeMap<usize, Vec<GenomeSegment>> = BTreeMap::new();
    for &evidence_index in cluster.members.iter() {
        let partner = *get_side_segment(get_breakend_pair(&evidence[evidence_index]), partner_role);
        chrom_segments
            .entry(partner.chrom_index)
            .or_default()
            .push(partner);
    }

    let mut best: Option<&Vec<GenomeSegment>> = None;
    for segments in chrom_segments.values() {
        if best.is_none_or(|x| segments.len() > x.len()) {
            best = Some(segments);
        }
    }
    get_representative_segment(best.unwrap())
}

/// Cluster one side of the given two-sided evidence and add the clusters to the arena
fn cluster_side(
    evidence: &[EvidenceSignature],
    sv_type: SvType,
    role: ClusterRole,
    partner_role: ClusterRole,
    max_distance: i64,
    evidence_indexes: &[EvidenceIndex],
    arena: &mut ClusterArena,
) -> Vec<SideCluster> {
    let positioned_evidence = evidence_indexes
        .iter()
        .map(|&evidence_index| PositionedEvidence {
            segment: *get_side_segment(get_breakend_pair(&evidence[evidence_index]), role),
            evidence_index,
        })
        .collect::<Vec<_>>();

    let linkage_settings = LinkageSettings {
        metric: DistanceMetric::Position,
        normalizer: 1.0,
        max_distance: max_distance as f64,
    };
    let clusters = cluster_positioned_evidence(
        evidence,
        sv_type,
        role,
        positioned_evidence,
        max_distance,
        PartitionGapMode::End,
        &linkage_settings,
    );

    let side_clusters = clusters
        .iter()
        .map(|x| {
            (
                x.representative,
                x.support(),
                get_expected_partner(evidence, x, partner_role),
            )
        })
        .collect::<Vec<_>>();
    arena
        .extend(clusters)
        .into_iter()
        .zip(side_clusters)
        .map(|(id, (locus, support, expected_partner))| SideCluster {
            id,
            locus,
            support,
            expected_partner,
        })
        .collect()
}

/// Joint offset between a source and a destination cluster, summed over both sides
///
/// Returns None if either side's expected partner is on a different chromosome.
///
fn get_joint_distance(source: &SideCluster, destination: &SideCluster) -> Option<i64> {
    if source.expected_partner.chrom_index != destination.locus.chrom_index
        || destination.expected_partner.chrom_index != source.locus.chrom_index
    {
        return None;
    }
    let dest_offset =
        (source.expected_partner.range.center() - destination.locus.range.center()).abs();
    let source_offset =
        (destination.expected_partner.range.center() - source.locus.range.center()).abs();
    Some(dest_offset + source_offset)
}

/// Find all compatible source and destination cluster pairs
///
/// Returns (joint distance, source index, destination index) for each pair within
/// `max_distance`, sorted by joint distance, then source order, then destination order.
///
fn get_pair_candidates(
    max_distance: i64,
    sources: &[SideCluster],
    destinations: &[SideCluster],
) -> Vec<(i64, usize, usize)> {
    // Index destinations by chromosome and center for a windowed search
    let mut chrom_destinations: BTreeMap<usize, Vec<(i64, usize)>> = BTreeMap::new();
    for (dest_index, dest) in destinations.iter().enumerate() {
        chrom_destinations
            .entry(dest.locus.chrom_index)
            .or_default()
            .push((dest.locus.range.center(), dest_index));
    }
    for x in chrom_destinations.values_mut() {
        x.sort_unstable();
    }

    let mut candidates = Vec::new();
    for (source_index, source) in sources.iter().enumerate() {
        let Some(chrom_dests) = chrom_destinations.get(&source.expected_partner.chrom_index)
        else {
            continue;
        };
        let center = source.expected_partner.range.center();
        let first = chrom_dests.partition_point(|(x, _)| *x < center - max_distance);
        for &(dest_center, dest_index) in chrom_dests[first..].iter() {
            if dest_center > center + max_distance {
                break;
            }
            if let Some(dist) = get_joint_distance(source, &destinations[dest_index])
                && dist <= max_distance
            {
                candidates.push((dist, source_index, dest_index));
            }
        }
    }
    candidates.sort_unstable();
    candidates
}

/// Group side clusters which share member evidence
///
/// Source cluster `i` is node `i` and destination cluster `j` is node `sources.len() + j`.
/// Every group holds at least one source cluster and groups are ordered by their first source.
///
fn get_linked_side_groups(
    arena: &ClusterArena,
    sources: &[SideCluster],
    destinations: &[SideCluster],
) -> Vec<Vec<usize>> {
    let source_count = sources.len();
    let mut evidence_source = BTreeMap::new();
    for (source_index, source) in sources.iter().enumerate() {
        for &evidence_index in arena.get(source.id).members.iter() {
            evidence_source.insert(evidence_index, source_index);
        }
    }

    let mut uf = UnionFind::new(source_count + destinations.len());
    for (dest_index, dest) in destinations.iter().enumerate() {
        for evidence_index in arena.get(dest.id).members.iter() {
            let source_index = evidence_source[evidence_index];
            uf.union(source_index, source_count + dest_index);
        }
    }
    uf.components()
}

/// Select at most one source and destination pair for each group of linked side clusters
///
/// Candidates are taken in order, so each group gets its closest compatible pair.
///
fn select_group_pairs(
    source_count: usize,
    groups: &[Vec<usize>],
    candidates: &[(i64, usize, usize)],
) -> Vec<Option<(usize, usize)>> {
    let mut node_group = BTreeMap::new();
    for (group_index, group) in groups.iter().enumerate() {
        for &node in group.iter() {
            node_group.insert(node, group_index);
        }
    }

    let mut group_pairs = vec![None; groups.len()];
    for &(_, source_index, dest_index) in candidates.iter() {
        let group_index = node_group[&source_index];
        if group_index != node_group[&(source_count + dest_index)] {
            continue;
        }
        if group_pairs[group_index].is_none() {
            group_pairs[group_index] = Some((source_index, dest_index));
        }
    }
    group_pairs
}

/// Run the two-sided sub-pipeline for one type
///
/// Source and destination clusters are appended to the arena. Side clusters sharing member
/// evidence are linked into groups, and each group becomes exactly one call, so that every
/// evidence record is traced to a single call. A group with a compatible source and destination
/// pair gives a complete call located at that pair. Any other group gives an incomplete call
/// located at its best supported source cluster.
///
pub fn resolve_two_sided(
    config: &CombineConfig,
    evidence: &[EvidenceSignature],
    sv_type: SvType,
    signature_cluster_ids: &[ClusterId],
    arena: &mut ClusterArena,
    combine_stats: &mut CombineStats,
) -> Vec<CombinedCall> {
    let debug = false;

    assert!(sv_type.is_two_sided());

    let mut evidence_indexes = signature_cluster_ids
        .iter()
        .flat_map(|&x| arena.get(x).members.iter().copied())
        .collect::<Vec<_>>();
    evidence_indexes.sort_unstable();
    evidence_indexes.dedup();

    let sources = cluster_side(
        evidence,
        sv_type,
        ClusterRole::Source,
        ClusterRole::Destination,
        config.trans_partition_max_distance,
        &evidence_indexes,
        arena,
    );
    let destinations = cluster_side(
        evidence,
        sv_type,
        ClusterRole::Destination,
        ClusterRole::Source,
        config.trans_destination_partition_max_distance,
        &evidence_indexes,
        arena,
    );

    combine_stats
        .source_cluster_count
        .insert(sv_type, sources.len());
    combine_stats
        .destination_cluster_count
        .insert(sv_type, destinations.len());

    let source_count = sources.len();
    let groups = get_linked_side_groups(arena, &sources, &destinations);
    let candidates = get_pair_candidates(config.trans_sv_max_distance, &sources, &destinations);
    let group_pairs = select_group_pairs(source_count, &groups, &candidates);

    let node_cluster = |node: usize| {
        if node < source_count {
            &sources[node]
        } else {
            &destinations[node - source_count]
        }
    };

    let mut calls = Vec::new();
    for (group, group_pair) in groups.iter().zip(group_pairs) {
        let (lead_nodes, partner_locus, completeness) = match group_pair {
            Some((source_index, dest_index)) => {
                let dest = &destinations[dest_index];
                debug_msg!(debug, "Pairing {:?} with {dest:?}", sources[source_index]);
                (
                    vec![source_index, source_count + dest_index],
                    Some(dest.locus),
                    CallCompleteness::Complete,
                )
            }
            None => {
                // Best supported source, ties going to the first
                let mut lead = group[0];
                for &node in group.iter().take_while(|&&x| x < source_count) {
                    if sources[node].support > sources[lead].support {
                        lead = node;
                    }
                }
                (vec![lead], None, CallCompleteness::Incomplete)
            }
        };

        let contributing_clusters = lead_nodes
            .iter()
            .copied()
            .chain(group.iter().copied().filter(|x| !lead_nodes.contains(x)))
            .map(|node| node_cluster(node).id)
            .collect();
        calls.push(CombinedCall::from_clusters(
            arena,
            sv_type,
            contributing_clusters,
            partner_locus,
            completeness,
        ));
    }

    let paired_count = calls.iter().filter(|x| x.is_complete()).count();
    combine_stats.paired_calls.insert(sv_type, paired_count);
    combine_stats
        .incomplete_calls
        .insert(sv_type, calls.len() - paired_count);

    calls
}
