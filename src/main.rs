use clap::Parser;
use log::{debug, info};

mod args;
mod survey;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    info!("args: {:?}", args);

    let res = survey::run_survey(&args);

    if let Err(e) = res {
        debug!("{:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
