//! The cluster stage
//!
//! Evidence is split into (type, chromosome) groups, each group is partitioned, and each
//! partition is clustered by single linkage under the configured distance metric.
//!

mod distance;
mod evidence_cluster;
mod linkage;
mod partition;
mod union_find;

use std::collections::BTreeMap;
use std::sync::mpsc::channel;

use log::info;
use simple_error::{SimpleResult, bail};
use strum::IntoEnumIterator;
use thousands::Separable;

pub use self::distance::DistanceMetric;
pub use self::evidence_cluster::*;
pub use self::linkage::{LinkageSettings, cluster_partition};
pub use self::union_find::UnionFind;
pub use self::partition::{
    EvidenceIndex, PartitionGapMode, PositionedEvidence, partition_evidence,
};
use crate::config::ClusterConfig;
use crate::evidence::{EvidenceSignature, SvType};
use crate::evidence_store::EvidenceStore;
use crate::run_stats::ClusterStats;

/// Partition and cluster one group of positioned evidence of a single type
///
/// Returns clusters in deterministic genomic order
///
pub fn cluster_positioned_evidence(
    evidence: &[EvidenceSignature],
    sv_type: SvType,
    role: ClusterRole,
    positioned_evidence: Vec<PositionedEvidence>,
    partition_max_distance: i64,
    partition_gap_mode: PartitionGapMode,
    linkage_settings: &LinkageSettings,
) -> Vec<EvidenceCluster> {
    let mut clusters = Vec::new();
    for partition in
        partition_evidence(positioned_evidence, partition_max_distance, partition_gap_mode)
    {
        for members in cluster_partition(linkage_settings, &partition) {
            clusters.push(EvidenceCluster::from_members(
                evidence, sv_type, role, &members,
            ));
        }
    }
    sort_clusters(&mut clusters);
    clusters
}

/// Group the primary loci of all evidence by (type, chromosome)
fn get_evidence_groups(
    evidence: &[EvidenceSignature],
) -> BTreeMap<(SvType, usize), Vec<PositionedEvidence>> {
    let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
    for (evidence_index, sig) in evidence.iter().enumerate() {
        let segment = *sig.evidence.primary();
        groups
            .entry((sig.sv_type(), segment.chrom_index))
            .or_default()
            .push(PositionedEvidence {
                segment,
                evidence_index,
            });
    }
    groups
}

/// Cluster all evidence in the store
///
/// Each (type, chromosome) group is clustered independently on the worker pool. Results are
/// gathered and sorted before being moved into the arena, so the output does not depend on
/// thread scheduling.
///
pub fn cluster_all_evidence(
    thread_count: usize,
    config: &ClusterConfig,
    store: &EvidenceStore,
) -> (ClusterArena, ClusterStats) {
    info!(
        "Clustering {} evidence signatures",
        store.evidence.len().separate_with_commas()
    );

    let linkage_settings = &LinkageSettings {
        metric: config.distance_metric,
        normalizer: config.distance_normalizer,
        max_distance: config.cluster_max_distance,
    };
    let evidence = &store.evidence;

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .unwrap();

    let (tx, rx) = channel();

    worker_pool.scope(move |scope| {
        for ((sv_type, _chrom_index), positioned_evidence) in get_evidence_groups(evidence) {
            let tx = tx.clone();
            scope.spawn(move |_| {
                let clusters = cluster_positioned_evidence(
                    evidence,
                    sv_type,
                    ClusterRole::Signature,
                    positioned_evidence,
                    config.partition_max_distance,
                    config.partition_gap_mode,
                    linkage_settings,
                );
                tx.send(clusters).unwrap();
            });
        }
    });

    let mut clusters = rx.into_iter().flatten().collect::<Vec<_>>();
    sort_clusters(&mut clusters);

    let mut cluster_stats = ClusterStats::default();
    for cluster in clusters.iter() {
        *cluster_stats
            .cluster_count
            .entry(cluster.sv_type)
            .or_default() += 1;
        cluster_stats
            .size_histograms
            .entry(cluster.sv_type)
            .or_default()
            .add_cluster(cluster);
    }
    cluster_stats.total_cluster_count = clusters.len();

    let mut arena = ClusterArena::default();
    arena.extend(clusters);

    for sv_type in SvType::iter() {
        info!(
            "Found {} {sv_type} evidence clusters",
            cluster_stats
                .cluster_count
                .get(&sv_type)
                .copied()
                .unwrap_or(0)
                .separate_with_commas()
        );
    }
    info!("Finished evidence clustering");

    (arena, cluster_stats)
}

/// Verify that the given clusters partition the given evidence
///
/// Every evidence index in `expected_members` must belong to exactly one of the clusters, every
/// cluster member must be expected, and every member must have the cluster's type.
///
pub fn check_cluster_partition<'a>(
    evidence: &[EvidenceSignature],
    expected_members: impl IntoIterator<Item = EvidenceIndex>,
    clusters: impl IntoIterator<Item = &'a EvidenceCluster>,
) -> SimpleResult<()> {
    let mut assignment_count = vec![0usize; evidence.len()];
    let mut expected = vec![false; evidence.len()];
    for evidence_index in expected_members {
        expected[evidence_index] = true;
    }

    for cluster in clusters {
        if cluster.members.is_empty() {
            bail!("Empty {} evidence cluster", cluster.sv_type);
        }
        for &evidence_index in cluster.members.iter() {
            let sig = &evidence[evidence_index];
            if sig.sv_type() != cluster.sv_type {
                bail!(
                    "{} evidence cluster contains {} evidence signature from read '{}'",
                    cluster.sv_type,
                    sig.sv_type(),
                    sig.read_name
                );
            }
            if !expected[evidence_index] {
                bail!(
                    "{} evidence cluster contains unexpected evidence signature from read '{}'",
                    cluster.sv_type,
                    sig.read_name
                );
            }
            assignment_count[evidence_index] += 1;
        }
    }

    for (evidence_index, &count) in assignment_count.iter().enumerate() {
        if expected[evidence_index] && count != 1 {
            bail!(
                "Evidence signature from read '{}' assigned to {count} clusters",
                evidence[evidence_index].read_name
            );
        }
    }
    Ok(())
}

/// Verify that the cluster stage output is a partition of each type's evidence
pub fn check_signature_clusters(store: &EvidenceStore, arena: &ClusterArena) -> SimpleResult<()> {
    check_cluster_partition(
        &store.evidence,
        0..store.evidence.len(),
        arena
            .iter()
            .map(|(_, x)| x)
            .filter(|x| x.role == ClusterRole::Signature),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_utils::get_test_config;
    use crate::evidence_store::test_utils::{get_test_store, one_sided, two_sided};

    #[test]
    fn test_two_close_deletions() {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                one_sided("chr1", 1000, 1050, "DEL", "r1"),
                one_sided("chr1", 1020, 1070, "DEL", "r2"),
            ],
        );
        let (arena, stats) = cluster_all_evidence(2, &config.cluster, &store);
        assert_eq!(arena.len(), 1);
        assert_eq!(stats.total_cluster_count, 1);

        let (_, cluster) = arena.iter().next().unwrap();
        assert_eq!(cluster.support(), 2);
        assert_eq!(cluster.sv_type, SvType::Deletion);
        assert_eq!(cluster.representative.range.start, 1010);
        assert_eq!(cluster.representative.range.end, 1060);
        check_signature_clusters(&store, &arena).unwrap();
    }

    #[test]
    fn test_types_and_chromosomes_never_mix() {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                one_sided("chr1", 1000, 1050, "DEL", "r1"),
                one_sided("chr1", 1000, 1050, "INV", "r2"),
                one_sided("chr2", 1000, 1050, "DEL", "r3"),
                two_sided("chr1", 1000, 1050, "DUP_INT", "chr3", 400, 401, "r4"),
            ],
        );
        let (arena, _) = cluster_all_evidence(3, &config.cluster, &store);
        assert_eq!(arena.len(), 4);
        check_signature_clusters(&store, &arena).unwrap();

        // Output is in genomic order
        let keys = arena.iter().map(|(_, x)| x.sort_key()).collect::<Vec<_>>();
        let mut sorted_keys = keys.clone();
        sorted_keys.sort();
        assert_eq!(keys, sorted_keys);
    }

    #[test]
    fn test_clustering_is_a_partition() {
        let config = get_test_config();
        let records = (0..60)
            .map(|i| {
                let start = (i * 7 % 13) as i64 * 150 + 1000;
                let sv_type = if i % 3 == 0 { "DEL" } else { "DUP" };
                one_sided("chr1", start, start + 100, sv_type, &format!("r{i}"))
            })
            .collect::<Vec<_>>();
        let store = get_test_store(&config, records);
        let (arena, _) = cluster_all_evidence(4, &config.cluster, &store);

        let total_support = arena.iter().map(|(_, x)| x.support()).sum::<usize>();
        assert_eq!(total_support, store.evidence.len());
        check_signature_clusters(&store, &arena).unwrap();
    }

    #[test]
    fn test_check_cluster_partition_detects_duplicates() {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                one_sided("chr1", 1000, 1050, "DEL", "r1"),
                one_sided("chr1", 9000, 9050, "DEL", "r2"),
            ],
        );
        let (arena, _) = cluster_all_evidence(1, &config.cluster, &store);
        let mut clusters = arena.iter().map(|(_, x)| x.clone()).collect::<Vec<_>>();
        assert_eq!(clusters.len(), 2);

        // Assign evidence 0 to both clusters
        clusters[1].members.insert(0, 0);
        assert!(check_cluster_partition(&store.evidence, 0..2, clusters.iter()).is_err());

        // Drop evidence 0 entirely
        clusters[0].members.clear();
        clusters.remove(0);
        clusters[0].members.retain(|&x| x != 0);
        assert!(check_cluster_partition(&store.evidence, 0..2, clusters.iter()).is_err());
    }

    #[test]
    fn test_check_cluster_partition_detects_mixed_types() {
        let config = get_test_config();
        let store = get_test_store(
            &config,
            vec![
                one_sided("chr1", 1000, 1050, "DEL", "r1"),
                one_sided("chr1", 1000, 1050, "INS", "r2"),
            ],
        );
        let (arena, _) = cluster_all_evidence(1, &config.cluster, &store);
        let mut clusters = arena.iter().map(|(_, x)| x.clone()).collect::<Vec<_>>();
        let moved = clusters[1].members[0];
        clusters[0].members.push(moved);
        clusters.remove(1);
        assert!(check_cluster_partition(&store.evidence, 0..2, clusters.iter()).is_err());
    }
}
