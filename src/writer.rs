//! Streams a planned slice's pixel data to a sink.
//!
//! Iterates row-by-row over the selected y range (handling declination
//! wrap, though no supported projection currently wraps there) and, for
//! each row, over the selected x range (handling right-ascension wrap
//! around a cylindrical projection's seam). Every run of bytes is either a
//! borrow straight out of the mmap'd input or a borrow of a single shared
//! zero buffer for out-of-bounds padding -- nothing is copied until the
//! final `write_vectored` call.
//!
//! Axes beyond x/y ("pre-axes") are walked with a mixed-radix counter: an
//! explicit odometer rather than recursion, since the axis count is small
//! and bounded (`NAXIS_MAX`) and a flat loop is easier to reason about
//! than unwinding a recursive call for an early exit.

use std::io::Write;

use crate::error::Result;
use crate::header::{HeaderInfo, NAXIS_MAX};
use crate::planner::Plan;
use crate::slice::Slice;
use crate::writeq::WriteQueue;

fn idiv(a: i64, b: i64) -> i64 {
    if a < 0 {
        -((-a) / b)
    } else {
        a / b
    }
}

fn imod(a: i64, b: i64) -> i64 {
    let c = a % b;
    if c < 0 {
        c + b
    } else {
        c
    }
}

/// Write `plan`'s output header followed by the sliced pixel data to
/// `sink`. `img_data` is the pixel payload of the input file, i.e.
/// everything after its primary header.
pub fn write_slice(
    info: &HeaderInfo,
    slice: &Slice,
    plan: &Plan,
    img_data: &[u8],
    sink: &mut dyn Write,
) -> Result<()> {
    let nbyte = plan.nbyte;
    let zeros = vec![0u8; (plan.nx.max(0) as usize) * nbyte as usize];

    let mut queue = WriteQueue::new(sink);
    queue.push(&plan.oheader)?;

    let npre = slice.naxes.saturating_sub(2);
    let mut pre_inds = [0i64; NAXIS_MAX - 2];

    loop {
        let mut ipre: i64 = 0;
        for ax in (0..npre).rev() {
            ipre = ipre * info.naxis[ax + 2] + slice.i1[ax + 2] + pre_inds[ax];
        }

        for ly in slice.y1()..slice.y2() {
            let y = if plan.wrapy != 0 { imod(ly, plan.wrapy) } else { ly };
            if y < 0 || y >= info.naxis[1] {
                queue.push(&zeros[..])?;
                continue;
            }

            let row_start = ((info.naxis[1] * ipre + y) * info.naxis[0]) as usize * nbyte as usize;
            let row_len = info.naxis[0] as usize * nbyte as usize;
            let rdata = &img_data[row_start..row_start + row_len];

            let nloop = if plan.wrapx != 0 { idiv(slice.x2(), plan.wrapx) } else { 0 };
            let mut x = slice.x1() - nloop * plan.wrapx;
            let x2 = slice.x2() - nloop * plan.wrapx;

            // Handling sky wrapping is tedious! Up to four runs per row:
            // a wrapped tail on the left, empty padding left of that (if
            // the selection runs off the unwrapped side too), the main
            // in-bounds run, and empty padding on the right.
            if x < 0 && plan.wrapx != 0 && x < info.naxis[0] - plan.wrapx {
                let n = info.naxis[0] - plan.wrapx - x;
                let off = (info.naxis[0] - n) as usize * nbyte as usize;
                queue.push(&rdata[off..off + n as usize * nbyte as usize])?;
                x += n;
            }
            if x < 0 {
                let n = -x;
                queue.push(&zeros[..n as usize * nbyte as usize])?;
                x += n;
            }
            if x < info.naxis[0] {
                let n = x2.min(info.naxis[0]) - x;
                let off = x as usize * nbyte as usize;
                queue.push(&rdata[off..off + n as usize * nbyte as usize])?;
                x += n;
            }
            if x < x2 {
                let n = x2 - x;
                queue.push(&zeros[..n as usize * nbyte as usize])?;
            }
        }

        let mut ax = 0;
        while ax < npre {
            pre_inds[ax] += 1;
            if pre_inds[ax] < plan.pre_lens[ax] {
                break;
            }
            pre_inds[ax] = 0;
            ax += 1;
        }
        if ax >= npre {
            break;
        }
    }

    queue.into_inner()?;
    Ok(())
}
