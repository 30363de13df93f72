//! goaf CLI - convert and verify goaf census survey datasets.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Context;
use logging::{init_logging, LogConfig};

fn main() {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_flags(cli.verbose, cli.quiet));

    let ctx = Context {
        data_dir: cli.data_dir,
        schema: cli.schema,
        extension: cli.extension,
    };

    let result = match cli.command {
        Commands::Convert {
            subject,
            output_dir,
            survey_date,
            json,
        } => commands::convert::run(&ctx, subject, output_dir, survey_date, json),

        Commands::ConvertAll {
            output_dir,
            subject,
            survey_date,
        } => commands::convert_all::run(&ctx, output_dir, subject, survey_date),

        Commands::Validate {
            subject,
            document,
            report,
            json,
        } => commands::validate::run(&ctx, subject, document, report, json),

        Commands::Discover { json } => commands::discover::run(&ctx, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
