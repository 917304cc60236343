//! Resolve ambiguous deletion, insertion and tandem duplication clusters
//!
//! Clusters of these types found at nearly the same locus with different types are merged into
//! a single call of the dominant type.
//!

use std::collections::BTreeMap;

use super::combined_call::{CallCompleteness, CombinedCall};
use crate::cluster_evidence::{ClusterArena, ClusterId};
use crate::evidence::SvType;
use crate::genome_segment::get_segment_center_distance;
use crate::log_utils::debug_msg;

/// Rank of each type in the ambiguity merge, lower rank dominates
///
/// Returns None for types which never take part in the merge.
///
pub fn del_ins_dup_precedence(sv_type: SvType) -> Option<usize> {
    match sv_type {
        SvType::TandemDuplication => Some(0),
        SvType::Insertion => Some(1),
        SvType::Deletion => Some(2),
        SvType::Inversion | SvType::Translocation | SvType::InsertionWithOrigin => None,
    }
}

/// A merge candidate: distance first, then the genomic order of both clusters
type CandidatePair = (i64, usize, usize);

/// Find all cross-type cluster pairs within `max_distance`
///
/// `cluster_ids` must be in genomic order, and returned pair members are indexes into it.
///
fn get_candidate_pairs(
    max_distance: i64,
    arena: &ClusterArena,
    cluster_ids: &[ClusterId],
) -> Vec<CandidatePair> {
    // Sort each chromosome's clusters by representative center for a windowed sweep
    let mut chrom_clusters: BTreeMap<usize, Vec<(i64, usize)>> = BTreeMap::new();
    for (order, &id) in cluster_ids.iter().enumerate() {
        let rep = &arena.get(id).representative;
        chrom_clusters
            .entry(rep.chrom_index)
            .or_default()
            .push((rep.range.center(), order));
    }

    let mut pairs = Vec::new();
    for centers in chrom_clusters.values_mut() {
        centers.sort_unstable();
        for (i, &(center1, order1)) in centers.iter().enumerate() {
            for &(center2, order2) in centers.iter().skip(i + 1) {
                if center2 - center1 > max_distance {
                    break;
                }
                let c1 = arena.get(cluster_ids[order1]);
                let c2 = arena.get(cluster_ids[order2]);
                if c1.sv_type == c2.sv_type {
                    continue;
                }
                let dist =
                    get_segment_center_distance(&c1.representative, &c2.representative).unwrap();
                pairs.push((
                    dist,
                    std::cmp::min(order1, order2),
                    std::cmp::max(order1, order2),
                ));
            }
        }
    }
    pairs.sort_unstable();
    pairs
}

/// Merge ambiguous deletion, insertion and tandem duplication clusters, and emit every other
/// cluster in the set as a singleton call
///
/// Candidate pairs are accepted in order of increasing distance, with ties broken by the genomic
/// order of the pair. Each cluster accepts at most one partner. The merged call takes the type
/// and locus of the cluster with the lower [del_ins_dup_precedence] rank.
///
/// `cluster_ids` must be in genomic order.
///
/// Returns a 2-tuple of (1) all calls and (2) the number of merged pairs
///
pub fn resolve_del_ins_dup(
    max_distance: i64,
    arena: &ClusterArena,
    cluster_ids: &[ClusterId],
) -> (Vec<CombinedCall>, usize) {
    let debug = false;

    let mut partner = vec![None; cluster_ids.len()];
    let mut merged_pair_count = 0;
    for (dist, order1, order2) in get_candidate_pairs(max_distance, arena, cluster_ids) {
        if partner[order1].is_some() || partner[order2].is_some() {
            continue;
        }
        debug_msg!(
            debug,
            "Merging clusters {:?} and {:?} at distance {dist}",
            cluster_ids[order1],
            cluster_ids[order2]
        );
        partner[order1] = Some(order2);
        partner[order2] = Some(order1);
        merged_pair_count += 1;
    }

    let rank = |order: usize| {
        let sv_type = arena.get(cluster_ids[order]).sv_type;
        del_ins_dup_precedence(sv_type).unwrap()
    };

    let mut calls = Vec::new();
    for (order, &id) in cluster_ids.iter().enumerate() {
        let contributing_clusters = match partner[order] {
            None => vec![id],
            Some(other) => {
                // Emit each merged pair once, from its dominant cluster
                if rank(other) < rank(order) {
                    continue;
                }
                vec![id, cluster_ids[other]]
            }
        };
        let final_type = arena.get(id).sv_type;
        calls.push(CombinedCall::from_clusters(
            arena,
            final_type,
            contributing_clusters,
            None,
            CallCompleteness::Complete,
        ));
    }

    (calls, merged_pair_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_evidence::{ClusterRole, EvidenceCluster};
    use crate::genome_segment::GenomeSegment;

    fn add_cluster(
        arena: &mut ClusterArena,
        sv_type: SvType,
        chrom_index: usize,
        start: i64,
        end: i64,
        support: usize,
    ) -> ClusterId {
        arena.push(EvidenceCluster {
            sv_type,
            role: ClusterRole::Signature,
            members: (0..support).collect(),
            representative: GenomeSegment::new(chrom_index, start, end),
            mean_mapq: 60.0,
        })
    }

    #[test]
    fn test_precedence_order() {
        let dup = del_ins_dup_precedence(SvType::TandemDuplication).unwrap();
        let ins = del_ins_dup_precedence(SvType::Insertion).unwrap();
        let del = del_ins_dup_precedence(SvType::Deletion).unwrap();
        assert!(dup < ins && ins < del);
        assert_eq!(del_ins_dup_precedence(SvType::Inversion), None);
    }

    #[test]
    fn test_dup_ins_merge() {
        let mut arena = ClusterArena::default();
        let ins = add_cluster(&mut arena, SvType::Insertion, 1, 7980, 8000, 2);
        let dup = add_cluster(&mut arena, SvType::TandemDuplication, 1, 7990, 8030, 3);

        let (calls, merged) = resolve_del_ins_dup(50, &arena, &[ins, dup]);
        assert_eq!(merged, 1);
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert_eq!(call.final_type, SvType::TandemDuplication);
        assert_eq!(call.contributing_clusters, vec![dup, ins]);
        assert_eq!(call.total_support, 5);
        assert_eq!(call.locus, GenomeSegment::new(1, 7990, 8030));
    }

    #[test]
    fn test_no_merge_beyond_distance_or_within_type() {
        let mut arena = ClusterArena::default();
        let del1 = add_cluster(&mut arena, SvType::Deletion, 0, 1000, 1100, 2);
        let del2 = add_cluster(&mut arena, SvType::Deletion, 0, 1010, 1110, 2);
        let ins = add_cluster(&mut arena, SvType::Insertion, 0, 5000, 5100, 2);
        let dup = add_cluster(&mut arena, SvType::TandemDuplication, 1, 1000, 1100, 2);

        let (calls, merged) = resolve_del_ins_dup(50, &arena, &[del1, del2, ins, dup]);
        assert_eq!(merged, 0);
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|x| x.contributing_clusters.len() == 1));
    }

    #[test]
    fn test_nearest_partner_wins() {
        let mut arena = ClusterArena::default();
        // The insertion is closest to the second deletion, the first deletion stays single
        let del1 = add_cluster(&mut arena, SvType::Deletion, 0, 1000, 1100, 1);
        let ins = add_cluster(&mut arena, SvType::Insertion, 0, 1030, 1130, 1);
        let del2 = add_cluster(&mut arena, SvType::Deletion, 0, 1040, 1140, 1);

        let (calls, merged) = resolve_del_ins_dup(50, &arena, &[del1, ins, del2]);
        assert_eq!(merged, 1);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].contributing_clusters, vec![del1]);
        assert_eq!(calls[1].contributing_clusters, vec![ins, del2]);
        assert_eq!(calls[1].final_type, SvType::Insertion);
    }

    #[test]
    fn test_equal_distance_tie_breaks_on_genomic_order() {
        let mut arena = ClusterArena::default();
        let del1 = add_cluster(&mut arena, SvType::Deletion, 0, 980, 1080, 1);
        let dup = add_cluster(&mut arena, SvType::TandemDuplication, 0, 1000, 1100, 1);
        let del2 = add_cluster(&mut arena, SvType::Deletion, 0, 1020, 1120, 1);

        let (calls, merged) = resolve_del_ins_dup(50, &arena, &[del1, dup, del2]);
        assert_eq!(merged, 1);
        let merged_call = calls
            .iter()
            .find(|x| x.contributing_clusters.len() == 2)
            .unwrap();
        assert_eq!(merged_call.contributing_clusters, vec![dup, del1]);
    }
}
