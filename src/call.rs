use camino::Utf8Path;
use simple_error::SimpleResult;

use crate::call_output::{write_calls_bed, write_calls_vcf};
use crate::cli;
use crate::cluster::{ingest_and_cluster_evidence, write_cluster_output};
use crate::combine_clusters::combine_clusters;
use crate::run_stats::{RunStats, write_run_stats};

/// Cluster all evidence and combine the clusters into classified calls
///
/// No output is written until both stages have passed their consistency checks.
///
pub fn run_call(
    shared_settings: &cli::SharedSettings,
    settings: &cli::CallSettings,
) -> SimpleResult<()> {
    let config = settings.pipeline_config();
    let (store, arena, cluster_stats) = ingest_and_cluster_evidence(
        shared_settings.thread_count,
        Utf8Path::new(&settings.evidence.evidence_filename),
        &config.ingest,
        &config.cluster,
    )?;

    let (call_set, combine_stats) = combine_clusters(&config.combine, &store, arena)?;

    let output_dir = &settings.output_dir;
    write_cluster_output(output_dir, &settings.evidence, &store, &call_set.arena);
    write_calls_bed(output_dir, &store.chrom_list, &call_set);
    write_calls_vcf(output_dir, &store.chrom_list, &call_set);

    let run_stats = RunStats {
        ingest_stats: store.ingest_stats,
        cluster_stats,
        combine_stats: Some(combine_stats),
    };
    write_run_stats(output_dir, &run_stats);

    Ok(())
}
