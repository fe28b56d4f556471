//! The FITS primary-header codec.
//!
//! A primary header is a fixed grid of 36 cards of 80 ASCII bytes each.
//! Columns 1-8 (0-based: `0..8`) hold the keyword; columns 11-30 (0-based:
//! `10..30`) hold a right-justified 20-character value field. [`HeaderInfo`]
//! records, for every keyword the engine cares about, both the decoded
//! value and the byte offset of its value field within the original
//! buffer, so [`HeaderInfo::rewrite`] can poke just those 20-byte windows
//! back in place rather than reparsing and reserializing the whole header.

use crate::error::{Result, SliceError};

pub const HEADER_NROW: usize = 36;
pub const HEADER_NCOL: usize = 80;
pub const HEADER_SIZE: usize = HEADER_NROW * HEADER_NCOL;
pub const NAXIS_MAX: usize = 10;

const VALUE_OFFSET: usize = 10;
const VALUE_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct HeaderInfo {
    bitpix_pos: Option<usize>,
    pub bitpix: i32,

    naxes_pos: Option<usize>,
    pub naxes: usize,

    wcsaxes_pos: Option<usize>,
    pub wcsaxes: usize,

    naxis_pos: [Option<usize>; NAXIS_MAX],
    pub naxis: [i64; NAXIS_MAX],

    crpix_pos: [Option<usize>; NAXIS_MAX],
    pub crpix: [f64; NAXIS_MAX],

    cdelt_pos: [Option<usize>; NAXIS_MAX],
    pub cdelt: [f64; NAXIS_MAX],
}

impl HeaderInfo {
    /// Pixel size in bytes implied by BITPIX.
    pub fn pixel_bytes(&self) -> i64 {
        (self.bitpix.unsigned_abs() / 8) as i64
    }

    /// Longitude sky-wrap period in pixels, assuming a cylindrical
    /// projection. Zero means "no wrap" -- including when the header
    /// carries no usable WCS, in which case `cdelt[0]` is left at its
    /// zero default and there is no sky to wrap around.
    pub fn wrapx(&self) -> i64 {
        let cdelt0 = self.cdelt[0];
        if cdelt0 == 0.0 || !cdelt0.is_finite() {
            return 0;
        }
        (360.0 / cdelt0).abs().round() as i64
    }

    /// Parse a 2880-byte primary header. Fails if a required keyword
    /// (BITPIX, NAXIS, or any in-range NAXISn/CRPIXn/CDELTn) is missing.
    pub fn parse(header: &[u8; HEADER_SIZE]) -> Result<Self> {
        let mut info = HeaderInfo {
            bitpix_pos: None,
            bitpix: 0,
            naxes_pos: None,
            naxes: 0,
            wcsaxes_pos: None,
            wcsaxes: 0,
            naxis_pos: [None; NAXIS_MAX],
            naxis: [0; NAXIS_MAX],
            crpix_pos: [None; NAXIS_MAX],
            crpix: [0.0; NAXIS_MAX],
            cdelt_pos: [None; NAXIS_MAX],
            cdelt: [0.0; NAXIS_MAX],
        };

        for ri in 0..HEADER_NROW {
            let row = &header[ri * HEADER_NCOL..(ri + 1) * HEADER_NCOL];
            let name = &row[0..8];
            let data_off = ri * HEADER_NCOL + VALUE_OFFSET;
            let data = std::str::from_utf8(&row[VALUE_OFFSET..VALUE_OFFSET + VALUE_LEN])
                .map_err(|_| SliceError::Eparse("header value field is not valid UTF-8".into()))?
                .trim();

            if name == b"BITPIX  " {
                info.bitpix_pos = Some(data_off);
                info.bitpix = parse_int(data)?;
            } else if name == b"NAXIS   " {
                info.naxes_pos = Some(data_off);
                info.naxes = (parse_int::<i64>(data)? as usize).min(NAXIS_MAX);
            } else if name == b"WCSAXES " {
                info.wcsaxes_pos = Some(data_off);
                info.wcsaxes = (parse_int::<i64>(data)? as usize).min(NAXIS_MAX);
            } else if let Some(ax) = axis_index(name, b"NAXIS") {
                let ax = check_axis(ax)?;
                info.naxis_pos[ax] = Some(data_off);
                info.naxis[ax] = parse_int(data)?;
            } else if let Some(ax) = axis_index(name, b"CRPIX") {
                let ax = check_axis(ax)?;
                info.crpix_pos[ax] = Some(data_off);
                info.crpix[ax] = parse_float(data)?;
            } else if let Some(ax) = axis_index(name, b"CDELT") {
                let ax = check_axis(ax)?;
                info.cdelt_pos[ax] = Some(data_off);
                info.cdelt[ax] = parse_float(data)?;
            }
        }

        if info.bitpix_pos.is_none() {
            return Err(SliceError::Eparse("missing BITPIX".into()));
        }
        if info.naxes_pos.is_none() {
            return Err(SliceError::Eparse("missing NAXIS".into()));
        }
        for i in 0..info.naxes {
            if info.naxis_pos[i].is_none() {
                return Err(SliceError::Eparse(format!("missing NAXIS{}", i + 1)));
            }
        }
        for i in 0..info.wcsaxes {
            if info.crpix_pos[i].is_none() {
                return Err(SliceError::Eparse(format!("missing CRPIX{}", i + 1)));
            }
            if info.cdelt_pos[i].is_none() {
                return Err(SliceError::Eparse(format!("missing CDELT{}", i + 1)));
            }
        }

        Ok(info)
    }

    /// Overwrite every recorded value field with a freshly formatted
    /// representation of the (possibly modified) current value. Bytes of
    /// `buf` outside the recorded fields are left untouched.
    pub fn rewrite(&self, buf: &mut [u8; HEADER_SIZE]) {
        if let Some(pos) = self.bitpix_pos {
            write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{}", self.bitpix));
        }
        if let Some(pos) = self.naxes_pos {
            write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{}", self.naxes));
        }
        if let Some(pos) = self.wcsaxes_pos {
            write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{}", self.wcsaxes));
        }
        for i in 0..self.naxes {
            if let Some(pos) = self.naxis_pos[i] {
                write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{}", self.naxis[i]));
            }
        }
        for i in 0..self.wcsaxes {
            if let Some(pos) = self.crpix_pos[i] {
                write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{:.8}", self.crpix[i]));
            }
            if let Some(pos) = self.cdelt_pos[i] {
                write_field(&mut buf[pos..pos + VALUE_LEN], &format!("{:.15}", self.cdelt[i]));
            }
        }
    }

    /// Copy `src` into a new 2880-byte header, dropping any `NAXISn` card
    /// with n greater than `naxes`. Removed cards compact upward; the
    /// freed rows at the end are filled with ASCII spaces.
    pub fn prune(src: &[u8; HEADER_SIZE], naxes: usize) -> [u8; HEADER_SIZE] {
        let mut out = [b' '; HEADER_SIZE];
        let mut j = 0;

        for i in 0..HEADER_NROW {
            let row = &src[i * HEADER_NCOL..(i + 1) * HEADER_NCOL];
            if let Some(n) = axis_index(&row[0..8], b"NAXIS") {
                if n as usize > naxes {
                    continue;
                }
            }
            out[j * HEADER_NCOL..(j + 1) * HEADER_NCOL].copy_from_slice(row);
            j += 1;
        }

        out
    }
}

/// If `name` (an 8-byte keyword field) starts with `prefix` followed
/// immediately by a run of ASCII digits, return that number. Used both for
/// `NAXISn`/`CRPIXn`/`CDELTn` decoding and for `prune`'s axis-number scan.
/// Returns `None` for the bare keyword (no digits follow the prefix), which
/// is exactly the discriminator the donor C's `sscanf("NAXIS%d ", ...)`
/// relies on to tell `NAXIS` from `NAXISn`.
fn axis_index(name: &[u8], prefix: &[u8]) -> Option<i64> {
    if !name.starts_with(prefix) {
        return None;
    }
    let rest = &name[prefix.len()..];
    let ndigits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if ndigits == 0 {
        return None;
    }
    std::str::from_utf8(&rest[..ndigits]).ok()?.parse().ok()
}

fn check_axis(ax: i64) -> Result<usize> {
    let ax = ax - 1;
    if ax < 0 || ax as usize >= NAXIS_MAX {
        return Err(SliceError::Eparse(format!("axis index {} out of range", ax + 1)));
    }
    Ok(ax as usize)
}

fn parse_int<T: std::str::FromStr>(s: &str) -> Result<T> {
    s.parse()
        .map_err(|_| SliceError::Eparse(format!("malformed integer header value {:?}", s)))
}

fn parse_float(s: &str) -> Result<f64> {
    s.parse()
        .map_err(|_| SliceError::Eparse(format!("malformed float header value {:?}", s)))
}

/// Right-justify `text` into `field` (exactly [`VALUE_LEN`] bytes), padding
/// on the left with spaces, truncating from the left if `text` happens to
/// be longer than the field -- this mirrors `snprintf("%20d", ...)` into a
/// fixed 20-byte buffer, which never happens for realistic FITS values.
fn write_field(field: &mut [u8], text: &str) {
    debug_assert_eq!(field.len(), VALUE_LEN);
    let bytes = text.as_bytes();
    if bytes.len() >= VALUE_LEN {
        field.copy_from_slice(&bytes[bytes.len() - VALUE_LEN..]);
    } else {
        let pad = VALUE_LEN - bytes.len();
        field[..pad].fill(b' ');
        field[pad..].copy_from_slice(bytes);
    }
}
