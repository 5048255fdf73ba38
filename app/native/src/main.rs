//! ZoneRouter command-line entry point.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default: `zonerouter=info`).

use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    if let Err(err) = zonerouter_lib::cli::run() {
        eprintln!("zonerouter: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("zonerouter=info,zonerouter_lib=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
