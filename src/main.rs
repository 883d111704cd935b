mod cli;
mod console;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use console::{CliReporter, ConsolePrompter};
use dotenv::dotenv;
use doujin_sorter::stages::{bucket_artist_directories, group_by_artist, merge_staging_into_archive};
use doujin_sorter::utils::{AutoConfirm, Prompter};
use doujin_sorter::Pipeline;
use tracing::debug;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();
    let config = args
        .resolve_config()
        .context("Error loading configuration")?;
    debug!("config: {:?}", config);

    let reporter = CliReporter::new();
    let mut prompter: Box<dyn Prompter + '_> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(ConsolePrompter::new(&reporter))
    };

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = Pipeline::new(config)
                .run(prompter.as_mut(), &reporter)
                .context("Reorganization failed")?;
            console::print_grouping(&report.grouping);
            console::print_bucketing(&report.bucketing);
            match &report.merge {
                Some(merge) => console::print_merge(merge),
                None => println!("Complete!"),
            }
        }
        Commands::Group => {
            let report = group_by_artist(&config, &reporter).context("Grouping failed")?;
            console::print_grouping(&report);
        }
        Commands::Bucket => {
            let report =
                bucket_artist_directories(&config, &reporter).context("Bucketing failed")?;
            console::print_bucketing(&report);
        }
        Commands::Merge => {
            let report = merge_staging_into_archive(&config, prompter.as_mut(), &reporter)
                .context("Merge failed")?;
            console::print_merge(&report);
        }
        Commands::PrintConfig => {
            println!("Configuration: {:#?}", config);
        }
    }

    Ok(())
}
