use camino::Utf8PathBuf;
use clap::Args;
use const_format::concatcp;
use serde::Serialize;
use simple_error::SimpleResult;

use super::evidence::{EvidenceSettings, validate_and_fix_evidence_settings};

#[derive(Args, Serialize)]
pub struct ClusterSettings {
    /// Directory for all cluster command output (must not already exist)
    #[arg(long, value_name = "DIR", default_value = concatcp!(env!("CARGO_PKG_NAME"), "_cluster_output"))]
    pub output_dir: Utf8PathBuf,

    #[command(flatten)]
    pub evidence: EvidenceSettings,
}

pub fn validate_and_fix_cluster_settings(
    mut settings: ClusterSettings,
) -> SimpleResult<ClusterSettings> {
    settings.evidence = validate_and_fix_evidence_settings(settings.evidence)?;
    Ok(settings)
}
