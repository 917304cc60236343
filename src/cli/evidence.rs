use camino::Utf8PathBuf;
use clap::Args;
use serde::Serialize;
use simple_error::{SimpleResult, bail};

use super::defaults::{
    CLUSTER_MAX_DISTANCE, DISTANCE_NORMALIZER, MAX_SV_SIZE, MIN_MAPQ, MIN_SV_SIZE,
    PARTITION_MAX_DISTANCE,
};
use super::utils::{check_positive_distance, check_required_filename};
use crate::cluster_evidence::{DistanceMetric, PartitionGapMode};
use crate::config::{ClusterConfig, IngestConfig};

/// Evidence input, filtration and clustering settings shared by all commands
#[derive(Args, Serialize)]
pub struct EvidenceSettings {
    /// SV evidence signatures in tab-delimited format, optionally gzip-compressed (.gz)
    ///
    /// Each line gives: chrom, start, end, type, mapq and read name, followed by the destination
    /// chrom, start and end for the two-sided types BND and DUP_INT.
    ///
    #[arg(long = "evidence", value_name = "FILE")]
    pub evidence_filename: String,

    /// Minimum MAPQ value for evidence signatures to be used
    #[arg(long, default_value_t = MIN_MAPQ)]
    pub min_mapq: u32,

    /// Minimum implied SV size of evidence signatures. Not applied to BND evidence.
    #[arg(long, default_value_t = MIN_SV_SIZE)]
    pub min_sv_size: i64,

    /// Maximum implied SV size of evidence signatures. Not applied to BND evidence.
    #[arg(long, default_value_t = MAX_SV_SIZE)]
    pub max_sv_size: i64,

    /// Distance metric used to link evidence signatures into clusters
    #[arg(long, value_enum, default_value_t = DistanceMetric::SpanPosition)]
    pub distance_metric: DistanceMetric,

    /// Divisor applied to the position component of the span-position and gowda-diday metrics
    #[arg(long, default_value_t = DISTANCE_NORMALIZER)]
    pub distance_normalizer: f64,

    /// Evidence separated by more than this many bases is never placed in the same partition
    #[arg(long, default_value_t = PARTITION_MAX_DISTANCE)]
    pub partition_max_distance: i64,

    /// Measure the partition gap from the furthest end seen in the partition, or from the
    /// previous start
    #[arg(hide = true, long, value_enum, default_value_t = PartitionGapMode::End)]
    pub partition_gap_mode: PartitionGapMode,

    /// Maximum distance for linking two evidence signatures, in units of the distance metric
    #[arg(long, default_value_t = CLUSTER_MAX_DISTANCE)]
    pub cluster_max_distance: f64,

    /// Write all evidence clusters to a MessagePack file in the output directory
    #[arg(long)]
    pub write_cluster_cache: bool,
}

impl EvidenceSettings {
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            min_mapq: self.min_mapq,
            min_sv_size: self.min_sv_size,
            max_sv_size: self.max_sv_size,
        }
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig {
            distance_metric: self.distance_metric,
            distance_normalizer: self.distance_normalizer,
            partition_max_distance: self.partition_max_distance,
            partition_gap_mode: self.partition_gap_mode,
            cluster_max_distance: self.cluster_max_distance,
        }
    }
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
/// Assumes that the logger is not setup
///
pub fn validate_and_fix_evidence_settings(
    mut settings: EvidenceSettings,
) -> SimpleResult<EvidenceSettings> {
    check_required_filename(&settings.evidence_filename, "evidence signature")?;

    if settings.min_sv_size < 0 {
        bail!("--min-sv-size argument must not be negative");
    }
    if settings.min_sv_size > settings.max_sv_size {
        bail!(
            "--min-sv-size ({}) is greater than --max-sv-size ({})",
            settings.min_sv_size,
            settings.max_sv_size
        );
    }

    check_positive_distance(settings.distance_normalizer, 0.0, "distance-normalizer")?;
    check_positive_distance(settings.partition_max_distance, 0, "partition-max-distance")?;
    check_positive_distance(settings.cluster_max_distance, 0.0, "cluster-max-distance")?;

    settings.evidence_filename = Utf8PathBuf::from(&settings.evidence_filename)
        .canonicalize_utf8()
        .unwrap()
        .to_string();

    Ok(settings)
}
