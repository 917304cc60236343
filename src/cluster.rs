use camino::Utf8Path;
use simple_error::SimpleResult;

use crate::cli;
use crate::cluster_evidence::{ClusterArena, check_signature_clusters, cluster_all_evidence};
use crate::cluster_output::{
    write_cluster_cache, write_evidence_clusters_bed, write_evidence_clusters_vcf,
};
use crate::config::{ClusterConfig, IngestConfig};
use crate::evidence_store::EvidenceStore;
use crate::run_stats::{ClusterStats, RunStats, write_run_stats};

/// Read and filter the evidence signatures, then cluster them
///
/// Returns a 3-tuple of (1) the evidence store (2) the cluster arena and (3) cluster statistics
///
pub fn ingest_and_cluster_evidence(
    thread_count: usize,
    evidence_filename: &Utf8Path,
    ingest_config: &IngestConfig,
    cluster_config: &ClusterConfig,
) -> SimpleResult<(EvidenceStore, ClusterArena, ClusterStats)> {
    let store = EvidenceStore::from_file(ingest_config, evidence_filename);

    let (arena, cluster_stats) = cluster_all_evidence(thread_count, cluster_config, &store);
    check_signature_clusters(&store, &arena)?;

    Ok((store, arena, cluster_stats))
}

/// Write the evidence cluster bed file and the optional cluster cache
pub fn write_cluster_output(
    output_dir: &Utf8Path,
    settings: &cli::EvidenceSettings,
    store: &EvidenceStore,
    arena: &ClusterArena,
) {
    write_evidence_clusters_bed(output_dir, &store.chrom_list, arena);
    write_evidence_clusters_vcf(output_dir, &store.chrom_list, arena);
    if settings.write_cluster_cache {
        write_cluster_cache(output_dir, &store.chrom_list, &store.evidence, arena);
    }
}

pub fn run_cluster(
    shared_settings: &cli::SharedSettings,
    settings: &cli::ClusterSettings,
) -> SimpleResult<()> {
    let evidence_settings = &settings.evidence;
    let (store, arena, cluster_stats) = ingest_and_cluster_evidence(
        shared_settings.thread_count,
        Utf8Path::new(&evidence_settings.evidence_filename),
        &evidence_settings.ingest_config(),
        &evidence_settings.cluster_config(),
    )?;

    write_cluster_output(&settings.output_dir, &settings.evidence, &store, &arena);

    let run_stats = RunStats {
        ingest_stats: store.ingest_stats,
        cluster_stats,
        combine_stats: None,
    };
    write_run_stats(&settings.output_dir, &run_stats);

    Ok(())
}
