//! The engine's tagged result codes.
//!
//! These map 1:1 onto the status codes the donor C implementation returned
//! from `slice_fits()`: `EMAP`, `EPARSE`, `EVALS`, `EALLOC`, `EIO`. `OFD`
//! (dry run completed) and `UNKNOWN` are not represented here -- `OFD` is a
//! success, not an error (see [`crate::engine::slice_fits`], which returns
//! the same `Ok(size)` for a dry run as for a real write), and `UNKNOWN` is
//! unreachable by construction in the Rust port.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SliceError {
    /// Memory-mapping the input failed.
    #[error("failed to map input file: {0}")]
    Emap(#[source] std::io::Error),

    /// The header or selector could not be parsed.
    #[error("parse error: {0}")]
    Eparse(String),

    /// The selector was syntactically fine but describes an invalid or
    /// out-of-bounds region.
    #[error("invalid selection: {0}")]
    Evals(String),

    /// A host allocation (the zero page) failed.
    #[error("allocation failed")]
    Ealloc,

    /// Writing to the output sink failed.
    #[error("write error: {0}")]
    Eio(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SliceError>;
