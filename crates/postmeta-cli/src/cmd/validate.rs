//! Validate subcommand - pre-deploy checks; fails when any row has an error

use anyhow::Result;
use clap::Args;
use postmeta_validate::ValidateConfig;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Print every issue, warnings included
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn run(args: ValidateArgs, config: &Config) -> Result<()> {
    let validate_config = ValidateConfig {
        csv_path: config.paths.csv.clone(),
        episodes_path: config.paths.episodes.clone(),
        image_dir: config.paths.image_dir.clone(),
        placeholder_cutoff: config.dates.placeholder_before,
    };

    let report = postmeta_validate::validate(&validate_config)?;

    eprintln!("{}", report.format_summary());
    if args.verbose || report.has_errors() {
        eprintln!("{}", report.format_issues(args.verbose));
    }

    if report.has_errors() {
        anyhow::bail!(
            "{} errors in {} rows",
            report.error_count(),
            report.rows_with_errors()
        );
    }
    eprintln!(
        "{} rows OK ({} warnings)",
        report.rows,
        report.warning_count()
    );
    Ok(())
}
