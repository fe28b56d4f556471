//! `fits-slice ifile pbox=y1:y2,x1:x2 ofile`, or
//! `fits-slice ifile box=dec1:dec2,ra1:ra2 ofile`.
//!
//! `--dry-run` skips the output file entirely and just prints the computed
//! size, mirroring the engine's dry-run (no-sink) path.

use std::process::ExitCode;

use clap::Parser;
use fits_slice::cli::{self, Args};

fn main() -> ExitCode {
    fits_slice::init_logging();
    let args = Args::parse();

    match cli::run(&args) {
        Ok(size) => {
            if args.dry_run {
                println!("{size}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "slice failed");
            ExitCode::FAILURE
        }
    }
}
