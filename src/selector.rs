//! The selector grammar: `name=spec,spec,...`.
//!
//! `name` is either `pbox` (pixel-space box) or `box` (world-coordinate
//! box, converted through WCS). Each comma-separated `spec` selects one
//! axis, in the reverse of the engine's own axis order (the grammar reads
//! left-to-right from the slowest-varying pre-axis down to the fastest,
//! mirroring how a human would write `cube=plane,y1:y2,x1:x2`). A `spec` is
//! either a single value (`5`), pinning that axis to one plane, or a
//! `lo:hi` range. Only the box/pbox's own two trailing axes (x and y) may
//! not be pinned to a single value.

use libc::{c_char, c_int};

use crate::header::{HeaderInfo, HEADER_NROW, HEADER_SIZE};
use crate::error::{Result, SliceError};
use crate::slice::{Slice, SliceMode};
use crate::wcs::Wcs;

/// Resolve `sel` (the part of the request after the input file name, e.g.
/// `box=10:20,-5.0:5.0`) into a [`Slice`] over `info`'s axes. A `None` or
/// empty selector yields the identity slice: the whole array.
pub fn parse(sel: Option<&str>, info: &HeaderInfo, header: &[u8; HEADER_SIZE]) -> Result<Slice> {
    let mut slice = Slice::full(info.naxes, &info.naxis);

    let sel = match sel {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(slice),
    };

    let eq = sel
        .find('=')
        .ok_or_else(|| SliceError::Eparse("selector is missing '='".into()))?;
    let name = &sel[..eq];
    let body = &sel[eq + 1..];

    let mut tmp_i1 = [0f64; crate::header::NAXIS_MAX];
    let mut tmp_i2 = [0f64; crate::header::NAXIS_MAX];
    let mut tmp_mode = [SliceMode::Range; crate::header::NAXIS_MAX];
    let mut tmp_naxes = 0usize;

    for field in body.split(',') {
        if tmp_naxes >= crate::header::NAXIS_MAX {
            return Err(SliceError::Eparse("too many axes in selector".into()));
        }
        let (v1, v2, mode) = parse_field(field)?;
        // The trailing two axes (x and y, read last here since the
        // grammar is pre-axes-first) may never be pinned to a single
        // plane: an image needs both of its spatial dimensions.
        if mode == SliceMode::Single && tmp_naxes + 2 >= info.naxes {
            return Err(SliceError::Eparse(
                "the last two axes of a selector cannot be single-valued".into(),
            ));
        }
        tmp_i1[tmp_naxes] = v1;
        tmp_i2[tmp_naxes] = v2;
        tmp_mode[tmp_naxes] = mode;
        tmp_naxes += 1;
    }

    let mut fix_order = false;
    match name {
        "box" => {
            if tmp_naxes < 2 {
                return Err(SliceError::Eparse("box= selector needs at least two axes".into()));
            }
            let mut wcs = unsafe {
                Wcs::new_raw(header.as_ptr() as *const c_char, HEADER_NROW as c_int)
            }
            .map_err(|e| SliceError::Eparse(e.to_string()))?;

            let world = [
                [tmp_i1[tmp_naxes - 1], tmp_i1[tmp_naxes - 2]],
                [tmp_i2[tmp_naxes - 1], tmp_i2[tmp_naxes - 2]],
            ];
            let pixel = wcs
                .world_to_pixel_pair(world)
                .map_err(|e| SliceError::Eparse(e.to_string()))?;

            tmp_i1[tmp_naxes - 1] = (pixel[0][0] + 0.5).floor();
            tmp_i1[tmp_naxes - 2] = (pixel[0][1] + 0.5).floor();
            tmp_i2[tmp_naxes - 1] = (pixel[1][0] + 0.5).floor();
            tmp_i2[tmp_naxes - 2] = (pixel[1][1] + 0.5).floor();

            // FITS coordinate ambiguity near the sky-wrap seam might have
            // flipped the corner order; fixed up below once we know wrapx.
            fix_order = true;
        }
        _ => {
            // Any name other than "box" (conventionally "pbox") is treated
            // as already being in pixel space -- nothing to convert.
        }
    }

    // The grammar is read pre-axes-first, but Slice is indexed
    // fastest-varying-first; reverse on the way in.
    for i in 0..tmp_naxes {
        let dst = tmp_naxes - 1 - i;
        slice.i1[dst] = tmp_i1[i] as i64;
        slice.i2[dst] = tmp_i2[i] as i64;
        slice.mode[dst] = tmp_mode[i];
    }
    for i in 0..slice.naxes {
        if slice.mode[i] == SliceMode::Single {
            slice.i2[i] = slice.i1[i] + 1;
        }
    }

    if fix_order {
        let wrapx = info.wrapx();
        if slice.i2[0] < slice.i1[0] {
            slice.i2[0] += wrapx;
        }
    }

    Ok(slice)
}

fn parse_field(field: &str) -> Result<(f64, f64, SliceMode)> {
    if let Some((a, b)) = field.split_once(':') {
        let v1: f64 = a
            .trim()
            .parse()
            .map_err(|_| SliceError::Eparse(format!("malformed range bound {:?}", a)))?;
        let v2: f64 = b
            .trim()
            .parse()
            .map_err(|_| SliceError::Eparse(format!("malformed range bound {:?}", b)))?;
        Ok((v1, v2, SliceMode::Range))
    } else {
        let v: f64 = field
            .trim()
            .parse()
            .map_err(|_| SliceError::Eparse(format!("malformed selector field {:?}", field)))?;
        Ok((v, v, SliceMode::Single))
    }
}
