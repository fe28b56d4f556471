//! A zero-copy slicing engine for rectangular (and hyper-rectangular)
//! regions of FITS images.
//!
//! The engine reads a FITS primary header and a selector describing the
//! region to cut out -- either in pixel space (`pbox=`) or, via wcslib, in
//! world coordinates (`box=`) -- and streams the result out with a single
//! vectored write, borrowing every run of pixel bytes straight out of the
//! mmap'd input rather than copying it into a staging buffer first.
//!
//! This library crate is compiled into two executables: `fits-slice`, a
//! one-shot CLI, and `fits-slice-server`, which serves cutouts over HTTP.

pub mod cli;
pub mod engine;
pub mod error;
pub mod header;
pub mod planner;
pub mod selector;
pub mod server;
pub mod slice;
pub mod wcs;
pub mod writeq;
pub mod writer;

pub use engine::slice_fits;
pub use error::{Result, SliceError};

/// Initialize this process's logging. Both binaries call this once at
/// startup; level is controlled by `RUST_LOG` (default: `info`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
