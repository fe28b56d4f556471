//! The top-level entry point: header parse → selector parse → plan →
//! write, composed into the one operation the rest of the crate exists to
//! support.

use std::io::Write;

use crate::error::{Result, SliceError};
use crate::header::{HeaderInfo, HEADER_SIZE};
use crate::{planner, selector, writer};

/// Slice `data` (a whole FITS file, typically mmap'd) according to `sel`
/// and, if `sink` is given, stream the result to it.
///
/// Always returns the computed output size on success, whether or not a
/// sink was given. Passing `sink: None` performs every validation step --
/// header parse, selector parse, bounds checks -- without writing a single
/// byte, which is how callers can answer a size-only query (e.g. to set
/// `Content-Length` before committing to a response); re-running with a
/// sink is guaranteed to write exactly as many bytes as the dry run
/// reported.
pub fn slice_fits(data: &[u8], sel: Option<&str>, sink: Option<&mut dyn Write>) -> Result<u64> {
    if data.len() < HEADER_SIZE {
        return Err(SliceError::Eparse("input is smaller than a single FITS header block".into()));
    }
    let header: [u8; HEADER_SIZE] = data[..HEADER_SIZE].try_into().unwrap();

    let info = HeaderInfo::parse(&header)?;
    let slice = selector::parse(sel, &info, &header)?;
    let plan = planner::plan(&info, &slice, &header)?;

    let sink = match sink {
        Some(sink) => sink,
        None => return Ok(plan.osize),
    };

    let img_data = &data[HEADER_SIZE..];
    writer::write_slice(&info, &slice, &plan, img_data, sink)?;

    Ok(plan.osize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HEADER_NCOL;

    fn make_fits(naxis: [i64; 2], bitpix: i32, fill: impl Fn(usize, usize) -> u8) -> Vec<u8> {
        let mut buf = vec![b' '; HEADER_SIZE];
        let mut row = 0;
        let mut put = |buf: &mut Vec<u8>, row: &mut usize, keyword: &str, value: &str| {
            let card = &mut buf[*row * HEADER_NCOL..(*row + 1) * HEADER_NCOL];
            card[0..keyword.len()].copy_from_slice(keyword.as_bytes());
            let vb = value.as_bytes();
            let start = 10 + 20 - vb.len();
            card[start..30].copy_from_slice(vb);
            *row += 1;
        };
        put(&mut buf, &mut row, "BITPIX", &bitpix.to_string());
        put(&mut buf, &mut row, "NAXIS", "2");
        put(&mut buf, &mut row, "NAXIS1", &naxis[0].to_string());
        put(&mut buf, &mut row, "NAXIS2", &naxis[1].to_string());
        put(&mut buf, &mut row, "WCSAXES", "2");
        put(&mut buf, &mut row, "CRPIX1", "1.0");
        put(&mut buf, &mut row, "CRPIX2", "1.0");
        put(&mut buf, &mut row, "CDELT1", "-1.0");
        put(&mut buf, &mut row, "CDELT2", "1.0");

        let nbyte = (bitpix.unsigned_abs() / 8) as usize;
        for y in 0..naxis[1] as usize {
            for x in 0..naxis[0] as usize {
                buf.push(fill(x, y));
                for _ in 1..nbyte {
                    buf.push(0);
                }
            }
        }
        buf
    }

    #[test]
    fn dry_run_reports_size_without_writing() {
        let data = make_fits([8, 4], 8, |x, y| (x + y) as u8);
        let size = slice_fits(&data, None, None).unwrap();
        assert_eq!(size, HEADER_SIZE as u64 + 8 * 4);
    }

    #[test]
    fn full_slice_roundtrips_pixel_bytes() {
        let data = make_fits([4, 3], 8, |x, y| (x + 10 * y) as u8);
        let mut out = Vec::new();
        let size = slice_fits(&data, None, Some(&mut out)).unwrap();
        assert_eq!(size, out.len() as u64);
        assert_eq!(&out[HEADER_SIZE..], &data[HEADER_SIZE..]);
    }

    #[test]
    fn pbox_subregion_matches_source_pixels() {
        let data = make_fits([10, 10], 8, |x, y| (x + 10 * y) as u8);
        let mut out = Vec::new();
        slice_fits(&data, Some("pbox=2:5,3:7"), Some(&mut out)).unwrap();
        let pixels = &out[HEADER_SIZE..];
        // y in 2..5 (3 rows), x in 3..7 (4 cols)
        assert_eq!(pixels.len(), 3 * 4);
        for (row, y) in (2..5).enumerate() {
            for (col, x) in (3..7).enumerate() {
                assert_eq!(pixels[row * 4 + col], (x + 10 * y) as u8);
            }
        }
    }

    #[test]
    fn out_of_bounds_x_range_is_zero_padded() {
        let data = make_fits([4, 4], 8, |_, _| 7u8);
        let mut out = Vec::new();
        slice_fits(&data, Some("pbox=0:4,-2:2"), Some(&mut out)).unwrap();
        let pixels = &out[HEADER_SIZE..];
        // x range -2..2: first two columns are padding, last two are real data.
        assert_eq!(pixels[0], 0);
        assert_eq!(pixels[1], 0);
        assert_eq!(pixels[2], 7);
        assert_eq!(pixels[3], 7);
    }

    #[test]
    fn reversed_range_is_evals_error() {
        let data = make_fits([4, 4], 8, |_, _| 0u8);
        let err = slice_fits(&data, Some("pbox=3:1,0:4"), None).unwrap_err();
        assert!(matches!(err, SliceError::Evals(_)));
    }

    #[test]
    fn truncated_input_is_parse_error() {
        let data = vec![b' '; 100];
        let err = slice_fits(&data, None, None).unwrap_err();
        assert!(matches!(err, SliceError::Eparse(_)));
    }
}
