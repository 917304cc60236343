//! Default values for command-line settings
//!

pub const MIN_MAPQ: u32 = 20;
pub const MIN_SV_SIZE: i64 = 40;
pub const MAX_SV_SIZE: i64 = 100_000;

pub const DISTANCE_NORMALIZER: f64 = 900.0;
pub const PARTITION_MAX_DISTANCE: i64 = 5000;
pub const CLUSTER_MAX_DISTANCE: f64 = 0.7;

pub const DEL_INS_DUP_MAX_DISTANCE: i64 = 100;
pub const TRANS_DESTINATION_PARTITION_MAX_DISTANCE: i64 = 1000;
pub const TRANS_PARTITION_MAX_DISTANCE: i64 = 200;
pub const TRANS_SV_MAX_DISTANCE: i64 = 500;
