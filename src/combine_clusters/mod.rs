//! The combine stage
//!
//! Evidence clusters are classified into final calls. Ambiguous deletion, insertion and tandem
//! duplication clusters are merged, inversion clusters pass through as single-cluster calls, and
//! two-sided clusters are rebuilt on their source and destination loci and paired.
//!

mod combined_call;
mod del_ins_dup;
mod two_sided;

use log::info;
use simple_error::{SimpleResult, bail};
use strum::IntoEnumIterator;
use thousands::Separable;

pub use self::combined_call::*;
use self::del_ins_dup::resolve_del_ins_dup;
use self::two_sided::resolve_two_sided;
use crate::cluster_evidence::{ClusterArena, ClusterId, ClusterRole, check_cluster_partition};
use crate::config::CombineConfig;
use crate::evidence::SvType;
use crate::evidence_store::EvidenceStore;
use crate::run_stats::CombineStats;

/// True for clusters which must be referenced by exactly one call
fn is_call_cluster(sv_type: SvType, role: ClusterRole) -> bool {
    if sv_type.is_two_sided() {
        role != ClusterRole::Signature
    } else {
        role == ClusterRole::Signature
    }
}

/// Get the indexes of all calls each evidence signature is traced to through the members of
/// the calls' contributing clusters
fn get_evidence_calls(evidence_count: usize, call_set: &CallSet) -> Vec<Vec<usize>> {
    let mut evidence_calls: Vec<Vec<usize>> = vec![Vec::new(); evidence_count];
    for (call_index, call) in call_set.calls.iter().enumerate() {
        for &id in call.contributing_clusters.iter() {
            for &evidence_index in call_set.arena.get(id).members.iter() {
                let calls = &mut evidence_calls[evidence_index];
                if calls.last() != Some(&call_index) {
                    calls.push(call_index);
                }
            }
        }
    }
    evidence_calls
}

/// Check that calls reference every call cluster exactly once, that each evidence signature
/// can be traced to exactly one cluster on each of its axes, and that each evidence signature
/// is traced to exactly one call
fn check_call_set(store: &EvidenceStore, call_set: &CallSet) -> SimpleResult<()> {
    let arena = &call_set.arena;
    let mut reference_count = vec![0usize; arena.len()];
    for call in call_set.calls.iter() {
        for &id in call.contributing_clusters.iter() {
            let cluster = arena.get(id);
            if !is_call_cluster(cluster.sv_type, cluster.role) {
                bail!(
                    "Call {} references {:?} {} cluster",
                    call.id,
                    cluster.role,
                    cluster.sv_type
                );
            }
            reference_count[id.0] += 1;
        }
    }
    for (id, cluster) in arena.iter() {
        if is_call_cluster(cluster.sv_type, cluster.role) && reference_count[id.0] != 1 {
            bail!(
                "{:?} {} cluster at {} is referenced by {} calls",
                cluster.role,
                cluster.sv_type,
                cluster.representative.to_region_str(&store.chrom_list),
                reference_count[id.0]
            );
        }
    }

    let evidence = &store.evidence;
    check_cluster_partition(
        evidence,
        0..evidence.len(),
        arena
            .iter()
            .map(|(_, x)| x)
            .filter(|x| is_call_cluster(x.sv_type, x.role) && x.role != ClusterRole::Destination),
    )?;
    check_cluster_partition(
        evidence,
        (0..evidence.len()).filter(|&x| evidence[x].sv_type().is_two_sided()),
        arena
            .iter()
            .map(|(_, x)| x)
            .filter(|x| x.role == ClusterRole::Destination),
    )?;

    for (evidence_index, calls) in get_evidence_calls(evidence.len(), call_set)
        .iter()
        .enumerate()
    {
        if calls.len() != 1 {
            let sig = &evidence[evidence_index];
            bail!(
                "Evidence from read '{}' at {} is traced to {} calls",
                sig.read_name,
                sig.evidence.primary().to_region_str(&store.chrom_list),
                calls.len()
            );
        }
    }
    Ok(())
}

/// Combine all evidence clusters into the final call set
///
/// The arena is extended with the source and destination clusters of two-sided types and then
/// moved into the returned call set.
///
pub fn combine_clusters(
    config: &CombineConfig,
    store: &EvidenceStore,
    mut arena: ClusterArena,
) -> SimpleResult<(CallSet, CombineStats)> {
    info!("Combining evidence clusters into calls");

    let mut combine_stats = CombineStats::default();
    let mut calls = Vec::new();
    let mut del_ins_dup_ids: Vec<ClusterId> = Vec::new();

    for sv_type in SvType::iter() {
        let ids = arena.ids_with(sv_type, ClusterRole::Signature);
        match sv_type {
            SvType::Deletion | SvType::Insertion | SvType::TandemDuplication => {
                del_ins_dup_ids.extend(ids);
            }
            SvType::Inversion => {
                calls.extend(ids.into_iter().map(|id| {
                    CombinedCall::from_clusters(
                        &arena,
                        sv_type,
                        vec![id],
                        None,
                        CallCompleteness::Complete,
                    )
                }));
            }
            SvType::Translocation | SvType::InsertionWithOrigin => {
                calls.extend(resolve_two_sided(
                    config,
                    &store.evidence,
                    sv_type,
                    &ids,
                    &mut arena,
                    &mut combine_stats,
                ));
            }
        }
    }

    del_ins_dup_ids.sort_by_key(|&x| arena.get(x).sort_key());
    let (del_ins_dup_calls, merged_pairs) =
        resolve_del_ins_dup(config.del_ins_dup_max_distance, &arena, &del_ins_dup_ids);
    calls.extend(del_ins_dup_calls);
    combine_stats.del_ins_dup_merged_pairs = merged_pairs;

    let call_set = CallSet::new(arena, calls);
    check_call_set(store, &call_set)?;

    for call in call_set.calls.iter() {
        *combine_stats.call_count.entry(call.final_type).or_default() += 1;
    }
    combine_stats.total_call_count = call_set.calls.len();

    info!(
        "Merged {} ambiguous deletion/insertion/duplication cluster pairs",
        merged_pairs.separate_with_commas()
    );
    for sv_type in SvType::iter() {
        let count = combine_stats
            .call_count
            .get(&sv_type)
            .copied()
            .unwrap_or(0);
        if sv_type.is_two_sided() {
            info!(
                "Found {} {sv_type} calls ({} with both sides resolved)",
                count.separate_with_commas(),
                combine_stats
                    .paired_calls
                    .get(&sv_type)
                    .copied()
                    .unwrap_or(0)
                    .separate_with_commas()
            );
        } else {
            info!("Found {} {sv_type} calls", count.separate_with_commas());
        }
    }
    info!("Finished combining evidence clusters");

    Ok((call_set, combine_stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_evidence::cluster_all_evidence;
    use crate::config::test_utils::get_test_config;
    use crate::evidence_store::RawEvidenceRecord;
    use crate::evidence_store::test_utils::{get_test_store, one_sided, two_sided};
    use crate::genome_segment::GenomeSegment;

    fn run_pipeline(records: Vec<RawEvidenceRecord>) -> (EvidenceStore, CallSet, CombineStats) {
        let config = get_test_config();
        let store = get_test_store(&config, records);
        let (arena, _) = cluster_all_evidence(2, &config.cluster, &store);
        let (call_set, stats) = combine_clusters(&config.combine, &store, arena).unwrap();
        (store, call_set, stats)
    }

    fn get_mixed_records() -> Vec<RawEvidenceRecord> {
        vec![
            one_sided("chr1", 1000, 1050, "DEL", "r1"),
            one_sided("chr1", 1020, 1070, "DEL", "r2"),
            one_sided("chr1", 7980, 8040, "INS", "r3"),
            one_sided("chr1", 7950, 8070, "DUP", "r4"),
            one_sided("chr1", 30000, 32000, "INV", "r5"),
            one_sided("chr2", 1000, 1200, "INV", "r6"),
            two_sided("chr1", 50000, 50000, "BND", "chr3", 900, 900, "r7"),
            two_sided("chr1", 50010, 50010, "BND", "chr3", 910, 910, "r8"),
            two_sided("chr2", 4000, 4500, "DUP_INT", "chr2", 90000, 90001, "r9"),
        ]
    }

    #[test]
    fn test_mixed_call_set() {
        let (_, call_set, stats) = run_pipeline(get_mixed_records());
        let labels = call_set
            .calls
            .iter()
            .map(|x| x.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                "svcluster.DEL.1",
                "svcluster.DUP.1",
                "svcluster.INV.1",
                "svcluster.BND.1",
                "svcluster.INV.2",
                "svcluster.DUP_INT.1",
            ]
        );

        let dup_call = &call_set.calls[1];
        assert_eq!(dup_call.final_type, SvType::TandemDuplication);
        assert_eq!(dup_call.total_support, 2);
        assert_eq!(dup_call.contributing_clusters.len(), 2);

        let bnd_call = &call_set.calls[3];
        assert!(bnd_call.is_complete());
        assert_eq!(bnd_call.total_support, 4);

        assert_eq!(stats.del_ins_dup_merged_pairs, 1);
        assert_eq!(stats.total_call_count, 6);
        assert_eq!(stats.paired_calls.get(&SvType::Translocation), Some(&1));
    }

    /// Fixed reorderings of the input records: reversal, every rotation, and even/odd
    /// interleavings
    fn get_record_orderings(records: &[RawEvidenceRecord]) -> Vec<Vec<RawEvidenceRecord>> {
        let mut orderings = vec![records.iter().rev().cloned().collect::<Vec<_>>()];
        for shift in 1..records.len() {
            let mut x = records.to_vec();
            x.rotate_left(shift);
            orderings.push(x);
        }
        let evens = records.iter().step_by(2);
        let odds = records.iter().skip(1).step_by(2);
        orderings.push(odds.clone().chain(evens.clone()).cloned().collect());
        orderings.push(evens.rev().chain(odds).cloned().collect());
        orderings
    }

    #[test]
    fn test_call_set_is_input_order_independent() {
        let summarize = |x: &CallSet| {
            x.calls
                .iter()
                .map(|c| {
                    (
                        c.id.clone(),
                        c.locus,
                        c.partner_locus,
                        c.completeness,
                        c.total_support,
                        c.contributing_clusters
                            .iter()
                            .map(|&id| x.arena.get(id).members.clone())
                            .collect::<Vec<_>>(),
                    )
                })
                .collect::<Vec<_>>()
        };

        let mut records = get_mixed_records();
        records.extend([
            two_sided("chr1", 5000, 5000, "BND", "chr5", 20000, 20000, "r10"),
            two_sided("chr1", 9000, 9000, "BND", "chr5", 20100, 20100, "r11"),
            one_sided("chr10", 400, 500, "DEL", "r12"),
            one_sided("chr2", 400, 500, "DEL", "r13"),
        ]);
        let (_, expected, _) = run_pipeline(records.clone());
        let expected = summarize(&expected);

        let orderings = get_record_orderings(&records);
        assert_eq!(orderings.len(), records.len() + 2);
        for ordering in orderings {
            assert_ne!(
                ordering.iter().map(|x| &x.read_name).collect::<Vec<_>>(),
                records.iter().map(|x| &x.read_name).collect::<Vec<_>>()
            );
            let (_, call_set, _) = run_pipeline(ordering);
            assert_eq!(summarize(&call_set), expected);
        }
    }

    #[test]
    fn test_far_deletion_and_insertion_stay_separate() {
        let (_, call_set, stats) = run_pipeline(vec![
            one_sided("chr1", 1000, 1100, "DEL", "r1"),
            one_sided("chr1", 5000, 5100, "INS", "r2"),
        ]);
        assert_eq!(call_set.calls.len(), 2);
        assert_eq!(stats.del_ins_dup_merged_pairs, 0);
        assert_eq!(call_set.calls[0].final_type, SvType::Deletion);
        assert_eq!(call_set.calls[1].final_type, SvType::Insertion);
    }

    #[test]
    fn test_incomplete_translocation() {
        let (store, call_set, stats) = run_pipeline(vec![
            two_sided("chr1", 5000, 5000, "BND", "chr5", 20000, 20000, "r1"),
            two_sided("chr1", 9000, 9000, "BND", "chr5", 20100, 20100, "r2"),
        ]);

        // Both sources share one destination cluster, so they resolve into a single call
        assert_eq!(call_set.calls.len(), 1);
        assert_eq!(stats.incomplete_calls.get(&SvType::Translocation), Some(&1));
        let call = &call_set.calls[0];
        assert_eq!(call.completeness, CallCompleteness::Incomplete);
        assert_eq!(call.partner_locus, None);
        assert_eq!(call.contributing_clusters.len(), 3);
        check_call_set(&store, &call_set).unwrap();
    }

    #[test]
    fn test_each_evidence_is_traced_to_one_call() {
        let (store, call_set, _) = run_pipeline(vec![
            one_sided("chr1", 1000, 1100, "DEL", "r0"),
            two_sided("chr1", 5000, 5000, "BND", "chr5", 20000, 20000, "r1"),
            two_sided("chr1", 9000, 9000, "BND", "chr5", 20100, 20100, "r2"),
            two_sided("chr1", 60000, 60000, "BND", "chr2", 700, 700, "r3"),
            two_sided("chr1", 60010, 60010, "BND", "chr2", 710, 710, "r4"),
            two_sided("chr1", 70000, 70000, "BND", "chr2", 1200, 1200, "r5"),
        ]);
        let evidence_calls = get_evidence_calls(store.evidence.len(), &call_set);
        assert_eq!(evidence_calls.len(), 6);
        for (evidence_index, calls) in evidence_calls.iter().enumerate() {
            assert_eq!(
                calls.len(),
                1,
                "read {} is traced to calls {calls:?}",
                store.evidence[evidence_index].read_name
            );
        }
    }

    #[test]
    fn test_check_call_set_detects_evidence_in_two_calls() {
        let (store, mut call_set, _) = run_pipeline(vec![
            two_sided("chr1", 5000, 5000, "BND", "chr5", 20000, 20000, "r1"),
            two_sided("chr1", 90000, 90000, "BND", "chr5", 70000, 70000, "r2"),
        ]);
        assert_eq!(call_set.calls.len(), 2);
        assert!(check_call_set(&store, &call_set).is_ok());

        // Move the second call's destination cluster into the first call
        let dest_id = call_set.calls[1].contributing_clusters.pop().unwrap();
        call_set.calls[0].contributing_clusters.push(dest_id);
        let err = check_call_set(&store, &call_set).unwrap_err();
        assert!(err.to_string().contains("traced to 2 calls"));
    }

    #[test]
    fn test_check_call_set_detects_missing_cluster() {
        let (store, mut call_set, _) = run_pipeline(vec![
            one_sided("chr1", 1000, 1100, "DEL", "r1"),
            one_sided("chr1", 9000, 9100, "DEL", "r2"),
        ]);
        assert!(check_call_set(&store, &call_set).is_ok());
        call_set.calls.pop();
        assert!(check_call_set(&store, &call_set).is_err());
    }

    #[test]
    fn test_empty_input() {
        let (_, call_set, stats) = run_pipeline(Vec::new());
        assert!(call_set.calls.is_empty());
        assert_eq!(call_set.arena.len(), 0);
        assert_eq!(stats.total_call_count, 0);
    }

    #[test]
    fn test_call_locus_is_dominant_cluster_representative() {
        let (_, call_set, _) = run_pipeline(vec![
            one_sided("chr1", 7980, 8040, "INS", "r1"),
            one_sided("chr1", 7950, 8070, "DUP", "r2"),
        ]);
        assert_eq!(call_set.calls.len(), 1);
        assert_eq!(call_set.calls[0].locus, GenomeSegment::new(0, 7950, 8070));
    }
}
