use clap::Parser;

use serve::cli::Cli;
use serve::config::Config;
use serve::error::StartupError;
use serve::{logger, server};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        logger::log_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), StartupError> {
    let cfg = Config::load(cli)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers.max(1));
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(server::run(cfg))
}
