use clap::Parser;
use log::{debug, info};

use std::error::Error;

mod args;
mod report;

fn main() {
    let args = args::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    match report::run_election_summary(&args) {
        Ok(()) => info!("Done"),
        Err(e) => {
            eprintln!("An error occured: {}", e);
            let mut source = e.source();
            while let Some(s) = source {
                eprintln!("  caused by: {}", s);
                source = s.source();
            }
            std::process::exit(1);
        }
    }
}
