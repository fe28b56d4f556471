//! The per-axis selection a parsed selector resolves to.

use crate::header::NAXIS_MAX;

/// Whether an axis keeps a range of indices or has been pinned to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMode {
    Range,
    Single,
}

/// A selection across every pixel axis of the input array.
///
/// Axis 0 is the fastest-varying axis ("x" / longitude), axis 1 the next
/// ("y" / latitude); axes 2.. are the "pre-axes" that the selector grammar
/// lets the caller either keep in full, range-slice, or pin to a single
/// plane. For axis `i`, `i1[i]` is the inclusive lower bound and `i2[i]`
/// the exclusive upper bound.
#[derive(Debug, Clone)]
pub struct Slice {
    pub i1: [i64; NAXIS_MAX],
    pub i2: [i64; NAXIS_MAX],
    pub mode: [SliceMode; NAXIS_MAX],
    pub naxes: usize,
}

impl Slice {
    /// A slice covering every pixel of every axis, as described by `naxis`.
    pub fn full(naxes: usize, naxis: &[i64; NAXIS_MAX]) -> Self {
        let mut slice = Slice {
            i1: [0; NAXIS_MAX],
            i2: [0; NAXIS_MAX],
            mode: [SliceMode::Range; NAXIS_MAX],
            naxes,
        };
        for i in 0..naxes {
            slice.i2[i] = naxis[i];
        }
        slice
    }

    pub fn x1(&self) -> i64 {
        self.i1[0]
    }
    pub fn x2(&self) -> i64 {
        self.i2[0]
    }
    pub fn y1(&self) -> i64 {
        self.i1[1]
    }
    pub fn y2(&self) -> i64 {
        self.i2[1]
    }
}
