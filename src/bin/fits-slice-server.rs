//! `fits-slice-server [-p PORT] [-l LOGFILE] [-d] [root_dir]`
//!
//! Serves FITS cutouts over plain HTTP GET: `GET /some/file.fits?pbox=...`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use fits_slice::server::{self, ServerConfig};

/// Serve FITS cutouts over HTTP.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Listen on this port.
    #[arg(short = 'p', long, default_value_t = 8200)]
    port: u16,

    /// Number of worker threads accepting connections.
    #[arg(long, default_value_t = 10)]
    nthreads: usize,

    /// Detach and run in the background.
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Server paths are resolved relative to this directory; no access
    /// outside of it is allowed.
    #[arg(default_value = ".")]
    root_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.daemon {
        if let Err(e) = server::daemonize() {
            eprintln!("failed to daemonize: {e}");
            return ExitCode::FAILURE;
        }
    }

    fits_slice::init_logging();

    let config = ServerConfig {
        port: args.port,
        basedir: args.root_dir,
        nthreads: args.nthreads,
    };

    if let Err(e) = server::run(config) {
        tracing::error!(error = %e, "server exited");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
