use clap::Parser;
use colored::Colorize;

use demand_registry::cli::{self, Cli};
use demand_registry::common::logger;

fn main() {
    logger::init();

    if let Err(err) = cli::run(Cli::parse()) {
        eprintln!("{} {:#}", "rejected:".red(), err);
        std::process::exit(1);
    }
}
