use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::SimpleResult;

use super::defaults::{
    DEL_INS_DUP_MAX_DISTANCE, TRANS_DESTINATION_PARTITION_MAX_DISTANCE,
    TRANS_PARTITION_MAX_DISTANCE, TRANS_SV_MAX_DISTANCE,
};
use super::evidence::{EvidenceSettings, validate_and_fix_evidence_settings};
use super::utils::check_positive_distance;
use crate::config::{CombineConfig, PipelineConfig};

/// Settings for combining evidence clusters into calls
#[derive(Args, Serialize)]
pub struct CombineSettings {
    /// Maximum distance in bases between the centers of overlapping DEL, INS and DUP clusters for
    /// them to be merged into a single call
    #[arg(long, default_value_t = DEL_INS_DUP_MAX_DISTANCE)]
    pub del_ins_dup_max_distance: i64,

    /// Partition and linkage distance in bases for clustering the destination side of BND and
    /// DUP_INT evidence
    #[arg(long, default_value_t = TRANS_DESTINATION_PARTITION_MAX_DISTANCE)]
    pub trans_destination_partition_max_distance: i64,

    /// Partition and linkage distance in bases for clustering the source side of BND and DUP_INT
    /// evidence
    #[arg(long, default_value_t = TRANS_PARTITION_MAX_DISTANCE)]
    pub trans_partition_max_distance: i64,

    /// Maximum summed source and destination offset in bases for pairing a source cluster with a
    /// destination cluster
    #[arg(long, default_value_t = TRANS_SV_MAX_DISTANCE)]
    pub trans_sv_max_distance: i64,
}

impl CombineSettings {
    pub fn combine_config(&self) -> CombineConfig {
        CombineConfig {
            del_ins_dup_max_distance: self.del_ins_dup_max_distance,
            trans_destination_partition_max_distance: self
                .trans_destination_partition_max_distance,
            trans_partition_max_distance: self.trans_partition_max_distance,
            trans_sv_max_distance: self.trans_sv_max_distance,
        }
    }
}

#[derive(Args, Serialize)]
pub struct CallSettings {
    /// Directory for all call command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_call_output"))]
    pub output_dir: Utf8PathBuf,

    #[command(flatten)]
    pub evidence: EvidenceSettings,

    #[command(flatten)]
    pub combine: CombineSettings,
}

impl CallSettings {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            ingest: self.evidence.ingest_config(),
            cluster: self.evidence.cluster_config(),
            combine: self.combine.combine_config(),
        }
    }
}

pub fn validate_and_fix_call_settings(mut settings: CallSettings) -> SimpleResult<CallSettings> {
    settings.evidence = validate_and_fix_evidence_settings(settings.evidence)?;

    let combine = &settings.combine;
    check_positive_distance(combine.del_ins_dup_max_distance, 0, "del-ins-dup-max-distance")?;
    check_positive_distance(
        combine.trans_destination_partition_max_distance,
        0,
        "trans-destination-partition-max-distance",
    )?;
    check_positive_distance(
        combine.trans_partition_max_distance,
        0,
        "trans-partition-max-distance",
    )?;
    check_positive_distance(combine.trans_sv_max_distance, 0, "trans-sv-max-distance")?;

    Ok(settings)
}
