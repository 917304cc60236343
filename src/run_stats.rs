//! Track stats for the whole run
//!

use std::collections::BTreeMap;
use std::fs::File;

use camino::Utf8Path;
use log::info;
use serde::{Deserialize, Serialize};
use unwrap::unwrap;

use crate::cluster_evidence::EvidenceCluster;
use crate::evidence::SvType;

pub const RUN_STATS_FILENAME: &str = "run.stats.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct IngestStats {
    pub accepted: BTreeMap<SvType, usize>,
    pub low_mapq_filtered: BTreeMap<SvType, usize>,
    pub size_filtered: BTreeMap<SvType, usize>,

    /// Records which could not be parsed and were dropped
    pub malformed_record_count: usize,
}

/// Upper bounds (exclusive) of the size histogram bins, the last bin is open-ended
const SIZE_BIN_UPPER_BOUNDS: [i64; 8] = [50, 100, 500, 1_000, 5_000, 10_000, 50_000, 100_000];

/// Histogram of representative SV sizes over the clusters of one type
///
/// This replaces size histogram plots with a small summary suitable for downstream plotting.
///
#[derive(Debug, Deserialize, Serialize)]
pub struct SizeHistogram {
    pub bin_labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl Default for SizeHistogram {
    fn default() -> Self {
        let mut bin_labels = Vec::new();
        let mut lower = 0;
        for upper in SIZE_BIN_UPPER_BOUNDS {
            bin_labels.push(format!("{lower}-{upper}"));
            lower = upper;
        }
        bin_labels.push(format!("{lower}+"));
        Self {
            counts: vec![0; bin_labels.len()],
            bin_labels,
        }
    }
}

impl SizeHistogram {
    pub fn add_size(&mut self, size: i64) {
        let bin_index = SIZE_BIN_UPPER_BOUNDS
            .iter()
            .position(|&x| size < x)
            .unwrap_or(SIZE_BIN_UPPER_BOUNDS.len());
        self.counts[bin_index] += 1;
    }

    /// Add a cluster's representative size, translocation clusters have no size and are skipped
    pub fn add_cluster(&mut self, cluster: &EvidenceCluster) {
        if cluster.sv_type != SvType::Translocation {
            self.add_size(cluster.representative.range.size());
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ClusterStats {
    pub total_cluster_count: usize,
    pub cluster_count: BTreeMap<SvType, usize>,
    pub size_histograms: BTreeMap<SvType, SizeHistogram>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CombineStats {
    /// Deletion, insertion and tandem duplication cluster pairs merged into one call
    pub del_ins_dup_merged_pairs: usize,

    pub source_cluster_count: BTreeMap<SvType, usize>,
    pub destination_cluster_count: BTreeMap<SvType, usize>,

    /// Two-sided calls with both a source and a destination cluster
    pub paired_calls: BTreeMap<SvType, usize>,

    /// Two-sided calls with only one side resolved
    pub incomplete_calls: BTreeMap<SvType, usize>,

    pub total_call_count: usize,
    pub call_count: BTreeMap<SvType, usize>,
}

#[derive(Deserialize, Serialize)]
pub struct RunStats {
    pub ingest_stats: IngestStats,
    pub cluster_stats: ClusterStats,
    pub combine_stats: Option<CombineStats>,
}

/// Write run_stats structure out in json format
pub fn write_run_stats(output_dir: &Utf8Path, run_stats: &RunStats) {
    let filename = output_dir.join(RUN_STATS_FILENAME);

    info!("Writing run statistics to file: '{filename}'");

    let f = unwrap!(
        File::create(&filename),
        "Unable to create run statistics json file: '{filename}'"
    );

    serde_json::to_writer_pretty(&f, &run_stats).unwrap();
}
