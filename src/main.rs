mod call;
mod call_output;
mod chrom_list;
mod cli;
mod cluster;
mod cluster_evidence;
mod cluster_output;
mod combine_clusters;
mod config;
mod evidence;
mod evidence_store;
mod genome_segment;
mod globals;
mod int_range;
mod log_utils;
mod logger;
mod os_utils;
mod run_stats;
mod vcf_utils;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::call::run_call;
use crate::cli::Commands;
use crate::cluster::run_cluster;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_output_dir_and_logger;

/// Run system configuration steps prior to starting any other program logic
///
fn system_configuration_prelude() {
    os_utils::attempt_max_open_file_limit();
}

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    cli::write_settings(settings.get_output_dir(), settings);

    match &settings.command {
        Commands::Cluster(x) => {
            run_cluster(&settings.shared, x)?;
        }
        Commands::Call(x) => {
            run_call(&settings.shared, x)?;
        }
    }

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    system_configuration_prelude();

    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    // Setup logger, including creation of the output directory for the log file:
    setup_output_dir_and_logger(
        settings.get_output_dir(),
        settings.shared.clobber,
        settings.shared.debug,
    );

    if let Err(err) = run(&settings) {
        log::error!("{err}");
        process::exit(2);
    }
}
