mod call;
mod cluster;
mod defaults;
mod evidence;
mod shared;
mod utils;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use simple_error::{SimpleResult, bail};
use unwrap::unwrap;

pub use self::call::CallSettings;
use self::call::validate_and_fix_call_settings;
pub use self::cluster::ClusterSettings;
use self::cluster::validate_and_fix_cluster_settings;
pub use self::evidence::EvidenceSettings;
pub use self::shared::SharedSettings;
use self::shared::validate_and_fix_shared_settings;
use crate::globals::PROGRAM_VERSION;

pub const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Serialize, Subcommand)]
pub enum Commands {
    /// Cluster SV evidence signatures and write the evidence clusters
    Cluster(ClusterSettings),

    /// Cluster SV evidence signatures and combine the clusters into classified SV calls
    Call(CallSettings),
}

#[derive(Parser, Serialize)]
#[command(
    author,
    version,
    about,
    help_template = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
)]
#[clap(propagate_version = true, rename_all = "kebab_case")]
pub struct Settings {
    #[command(flatten)]
    pub shared: SharedSettings,

    #[command(subcommand)]
    pub command: Commands,
}

impl Settings {
    pub fn get_output_dir(&self) -> &Utf8Path {
        match &self.command {
            Commands::Cluster(x) => &x.output_dir,
            Commands::Call(x) => &x.output_dir,
        }
    }
}

/// Checks if a directory does not exist
///
pub fn check_novel_dirname(dirname: &Utf8Path, label: &str) -> SimpleResult<()> {
    if dirname.exists() {
        bail!("{label} already exists: \"{dirname}\"");
    }
    Ok(())
}

/// Validate settings and update parameters that can't be processed by clap
///
pub fn validate_and_fix_settings_impl(mut settings: Settings) -> SimpleResult<Settings> {
    settings.shared = validate_and_fix_shared_settings(settings.shared)?;

    settings.command = match settings.command {
        Commands::Cluster(x) => {
            let x = validate_and_fix_cluster_settings(x)?;
            Commands::Cluster(x)
        }
        Commands::Call(x) => {
            let x = validate_and_fix_call_settings(x)?;
            Commands::Call(x)
        }
    };

    Ok(settings)
}

/// Validate settings and update to parameters that can't be processed automatically by clap.
///
pub fn validate_and_fix_settings(settings: Settings) -> Settings {
    match validate_and_fix_settings_impl(settings) {
        Ok(x) => x,
        Err(msg) => {
            eprintln!("Invalid command-line setting: {msg}");
            std::process::exit(exitcode::USAGE);
        }
    }
}

pub fn parse_settings() -> Settings {
    Settings::parse()
}

/// Write all settings out in json format
pub fn write_settings(output_dir: &Utf8Path, settings: &Settings) {
    #[derive(Serialize)]
    struct VersionedSettings<'a> {
        version: &'a str,
        settings: &'a Settings,
    }

    let filename = output_dir.join(SETTINGS_FILENAME);

    info!("Writing settings to file: '{filename}'");

    let f = unwrap!(
        std::fs::File::create(&filename),
        "Unable to create settings json file: '{filename}'"
    );

    let x = VersionedSettings {
        version: PROGRAM_VERSION,
        settings,
    };
    serde_json::to_writer_pretty(&f, &x).unwrap();
}
