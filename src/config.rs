//! Immutable pipeline configuration
//!
//! Built once from validated command-line settings and passed by reference to every stage.
//!

use serde::Serialize;

use crate::cluster_evidence::{DistanceMetric, PartitionGapMode};

#[derive(Clone, Debug, Serialize)]
pub struct IngestConfig {
    pub min_mapq: u32,
    pub min_sv_size: i64,
    pub max_sv_size: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct ClusterConfig {
    pub distance_metric: DistanceMetric,
    pub distance_normalizer: f64,
    pub partition_max_distance: i64,
    pub partition_gap_mode: PartitionGapMode,
    pub cluster_max_distance: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CombineConfig {
    /// Max representative center distance for merging deletion, insertion and tandem duplication
    /// clusters
    pub del_ins_dup_max_distance: i64,

    /// Partition and linkage distance for the destination axis of two-sided evidence
    pub trans_destination_partition_max_distance: i64,

    /// Partition and linkage distance for the source axis of two-sided evidence
    pub trans_partition_max_distance: i64,

    /// Max joint source plus destination offset for pairing source and destination clusters
    pub trans_sv_max_distance: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineConfig {
    pub ingest: IngestConfig,
    pub cluster: ClusterConfig,
    pub combine: CombineConfig,
}

#[cfg(test)]
pub mod test_utils {
    use super::*;

    /// Default-like configuration used throughout the unit tests
    pub fn get_test_config() -> PipelineConfig {
        PipelineConfig {
            ingest: IngestConfig {
                min_mapq: 20,
                min_sv_size: 40,
                max_sv_size: 100_000,
            },
            cluster: ClusterConfig {
                distance_metric: DistanceMetric::Position,
                distance_normalizer: 900.0,
                partition_max_distance: 500,
                partition_gap_mode: PartitionGapMode::End,
                cluster_max_distance: 100.0,
            },
            combine: CombineConfig {
                del_ins_dup_max_distance: 50,
                trans_destination_partition_max_distance: 1000,
                trans_partition_max_distance: 200,
                trans_sv_max_distance: 500,
            },
        }
    }
}
