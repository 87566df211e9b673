// src/main.rs

use tracing::error;

use pglisten::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    if let Err(err) = logging::init(args.log_level) {
        eprintln!("pglisten: failed to initialise logging: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run(args).await {
        error!(target: logging::CRITICAL_TARGET, "{err}");
        std::process::exit(1);
    }
}
