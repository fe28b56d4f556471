//! Turns a parsed [`Slice`] into a concrete, validated plan: the rewritten
//! output header, the sky-wrap periods, and the per-pre-axis loop lengths
//! the writer iterates over.

use crate::error::{Result, SliceError};
use crate::header::{HeaderInfo, HEADER_SIZE, NAXIS_MAX};
use crate::slice::{Slice, SliceMode};

pub struct Plan {
    pub oheader: [u8; HEADER_SIZE],
    /// Longitude wrap period in pixels, derived from CDELT1 under a
    /// cylindrical-projection assumption. Zero means "no wrap".
    pub wrapx: i64,
    /// Latitude wrap period. Always zero: no supported projection wraps
    /// in declination.
    pub wrapy: i64,
    pub nx: i64,
    pub ny: i64,
    pub nbyte: i64,
    /// Total output byte count (header + pixel data), as reported to
    /// callers that want to know a response's `Content-Length` up front.
    pub osize: u64,
    /// Loop length for each pre-axis (axes 2..), indexed from axis 2.
    pub pre_lens: [i64; NAXIS_MAX - 2],
}

pub fn plan(info: &HeaderInfo, slice: &Slice, header: &[u8; HEADER_SIZE]) -> Result<Plan> {
    // Sky-wrap info, assuming a cylindrical projection. We never allow a
    // selection wider than the whole sky: it would alias pixels onto
    // themselves in a way that's tedious to define and would confuse
    // other FITS-reading code anyway.
    let wrapy: i64 = 0;
    let wrapx = info.wrapx();

    if wrapy != 0 && slice.y2() - slice.y1() > wrapy {
        return Err(SliceError::Evals("y selection is wider than a full sky wrap".into()));
    }
    if wrapx != 0 && slice.x2() - slice.x1() > wrapx {
        return Err(SliceError::Evals("x selection is wider than a full sky wrap".into()));
    }

    // Slices must run in the right order, and pre-axis bounds (axis 2..)
    // must lie within the array: only x/y may run outside (that's what
    // produces the zero-padded border, and what lets x wrap around the
    // sky).
    for i in 0..slice.naxes {
        let out_of_bounds = i >= 2 && (slice.i1[i] < 0 || slice.i2[i] > info.naxis[i]);
        if slice.i2[i] < slice.i1[i] || out_of_bounds {
            return Err(SliceError::Evals(format!("axis {} selection is out of bounds", i)));
        }
    }

    let nx = slice.x2() - slice.x1();
    let ny = slice.y2() - slice.y1();
    let nbyte = info.pixel_bytes();

    let mut osize: u64 = 1;
    for i in 0..slice.naxes {
        osize *= (slice.i2[i] - slice.i1[i]) as u64;
    }
    osize = osize * nbyte as u64 + HEADER_SIZE as u64;

    // Build the output header. The main complication is the CRPIX shift
    // to account for the new origin, and dropping any pre-axis that got
    // pinned to a single plane.
    let mut oinfo = info.clone();
    oinfo.naxis[0] = nx;
    oinfo.naxis[1] = ny;
    oinfo.crpix[0] -= slice.x1() as f64;
    oinfo.crpix[1] -= slice.y1() as f64;

    let mut j = 2;
    for i in 2..slice.naxes {
        if slice.mode[i] == SliceMode::Single {
            oinfo.naxes -= 1;
        } else {
            oinfo.naxis[j] = slice.i2[i] - slice.i1[i];
            j += 1;
        }
    }

    let mut oheader = *header;
    oinfo.rewrite(&mut oheader);
    let oheader = HeaderInfo::prune(&oheader, oinfo.naxes);

    let mut pre_lens = [0i64; NAXIS_MAX - 2];
    for ax in 0..slice.naxes.saturating_sub(2) {
        pre_lens[ax] = if slice.mode[ax + 2] == SliceMode::Single {
            1
        } else {
            slice.i2[ax + 2] - slice.i1[ax + 2]
        };
    }

    Ok(Plan {
        oheader,
        wrapx,
        wrapy,
        nx,
        ny,
        nbyte,
        osize,
        pre_lens,
    })
}
