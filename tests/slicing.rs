//! End-to-end coverage of the six seed scenarios through
//! `engine::slice_fits`, plus the CLI's `--dry-run` path, built on
//! on-disk fixture FITS files.

use std::io::Write;

use fits_slice::cli::{self, Args};
use fits_slice::header::{HeaderInfo, HEADER_NCOL, HEADER_SIZE};
use fits_slice::{slice_fits, SliceError};

fn put_card(buf: &mut [u8], row: usize, keyword: &str, value: &str) {
    let card = &mut buf[row * HEADER_NCOL..(row + 1) * HEADER_NCOL];
    card[0..keyword.len()].copy_from_slice(keyword.as_bytes());
    let vb = value.as_bytes();
    let start = 10 + 20 - vb.len();
    card[start..30].copy_from_slice(vb);
}

/// Build a BITPIX=16 FITS primary HDU with `naxis` axes of the given
/// lengths and a given CDELT1 (for wrap-period control). `fill(coords)`
/// gives each pixel's value, where `coords[0]` is the fastest-varying
/// (internal axis 0 / "x") axis; pixels are stored 2 bytes wide so values
/// up to a few hundred (as used by the wrap scenario) round-trip exactly.
fn make_fits(naxis: &[i64], cdelt0: f64, fill: impl Fn(&[i64]) -> i16) -> Vec<u8> {
    let mut buf = vec![b' '; HEADER_SIZE];
    let mut row = 0;
    put_card(&mut buf, row, "BITPIX", "16");
    row += 1;
    put_card(&mut buf, row, "NAXIS", &naxis.len().to_string());
    row += 1;
    for (i, n) in naxis.iter().enumerate() {
        put_card(&mut buf, row, &format!("NAXIS{}", i + 1), &n.to_string());
        row += 1;
    }
    put_card(&mut buf, row, "WCSAXES", "2");
    row += 1;
    put_card(&mut buf, row, "CRPIX1", "1.0");
    row += 1;
    put_card(&mut buf, row, "CRPIX2", "1.0");
    row += 1;
    put_card(&mut buf, row, "CDELT1", &format!("{cdelt0}"));
    row += 1;
    put_card(&mut buf, row, "CDELT2", "1.0");

    let total: i64 = naxis.iter().product();
    let mut coords = vec![0i64; naxis.len()];
    for _ in 0..total {
        buf.extend_from_slice(&fill(&coords).to_ne_bytes());
        let mut ax = 0;
        while ax < naxis.len() {
            coords[ax] += 1;
            if coords[ax] < naxis[ax] {
                break;
            }
            coords[ax] = 0;
            ax += 1;
        }
    }
    buf
}

/// View a slice of output pixel bytes (following the 2880-byte header) as
/// `i16`s in the same native byte order `make_fits` wrote them in.
fn pixels16(data: &[u8]) -> Vec<i16> {
    data[HEADER_SIZE..]
        .chunks_exact(2)
        .map(|c| i16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

#[test]
fn scenario_no_op() {
    let data = make_fits(&[4, 3], -1.0, |c| (10 * c[1] + c[0]) as i16);
    let mut out = Vec::new();
    slice_fits(&data, None, Some(&mut out)).unwrap();

    // The header is only numerically equal, not byte-equal: `rewrite`
    // reformats every recorded value field (e.g. CRPIX1 "1.0" -> CRPIX1
    // "1.00000000"), so compare the parsed fields rather than raw bytes.
    let ihead: [u8; HEADER_SIZE] = data[..HEADER_SIZE].try_into().unwrap();
    let ohead: [u8; HEADER_SIZE] = out[..HEADER_SIZE].try_into().unwrap();
    let iinfo = HeaderInfo::parse(&ihead).unwrap();
    let oinfo = HeaderInfo::parse(&ohead).unwrap();
    assert_eq!(oinfo.naxes, iinfo.naxes);
    assert_eq!(oinfo.naxis[..iinfo.naxes], iinfo.naxis[..iinfo.naxes]);
    assert_eq!(oinfo.crpix[0], iinfo.crpix[0]);
    assert_eq!(oinfo.crpix[1], iinfo.crpix[1]);

    assert_eq!(&out[HEADER_SIZE..], &data[HEADER_SIZE..]);
}

#[test]
fn scenario_sub_rectangle() {
    let data = make_fits(&[4, 3], -1.0, |c| (10 * c[1] + c[0]) as i16);
    let mut out = Vec::new();
    slice_fits(&data, Some("pbox=1:2,1:3"), Some(&mut out)).unwrap();
    assert_eq!(pixels16(&out), vec![11, 12]);
}

#[test]
fn scenario_zero_fill_left() {
    let data = make_fits(&[4, 3], 1e-6, |_| 7i16);
    let mut out = Vec::new();
    slice_fits(&data, Some("pbox=0:3,-2:2"), Some(&mut out)).unwrap();
    let pixels = pixels16(&out);
    for row in 0..3 {
        assert_eq!(&pixels[row * 4..row * 4 + 4], &[0, 0, 7, 7]);
    }
}

#[test]
fn scenario_wrap() {
    let data = make_fits(&[360, 1], -1.0, |c| c[0] as i16);
    let mut out = Vec::new();
    slice_fits(&data, Some("pbox=0:1,350:370"), Some(&mut out)).unwrap();
    let pixels = pixels16(&out);
    let expected: Vec<i16> = (350..360).chain(0..10).map(|x| x as i16).collect();
    assert_eq!(pixels, expected);
}

#[test]
fn scenario_single_pre_axis() {
    let data = make_fits(&[4, 3, 2], -1.0, |c| (c[2] * 100 + 10 * c[1] + c[0]) as i16);
    let mut out = Vec::new();
    slice_fits(&data, Some("pbox=1,0:3,0:4"), Some(&mut out)).unwrap();
    let pixels = pixels16(&out);
    let expected: Vec<i16> = (0..3)
        .flat_map(|y| (0..4).map(move |x| (100 + 10 * y + x) as i16))
        .collect();
    assert_eq!(pixels, expected);
}

#[test]
fn scenario_dry_run() {
    let data = make_fits(&[4, 3], -1.0, |_| 0i16);
    let size = slice_fits(&data, None, None).unwrap();
    assert_eq!(size, HEADER_SIZE as u64 + 4 * 3 * 2);
}

#[test]
fn rejects_overwide_selection_before_writing() {
    let data = make_fits(&[4, 3], -1.0, |_| 0i16);
    let err = slice_fits(&data, Some("pbox=0:1,3:1"), None).unwrap_err();
    assert!(matches!(err, SliceError::Evals(_) | SliceError::Eparse(_)));
}

#[test]
fn cli_dry_run_reports_size_without_touching_output_file() {
    let mut ifile = tempfile::NamedTempFile::new().unwrap();
    let data = make_fits(&[4, 3], -1.0, |c| (10 * c[1] + c[0]) as i16);
    ifile.write_all(&data).unwrap();

    let args = Args {
        ifile: ifile.path().to_path_buf(),
        sel: "pbox=1:2,1:3".to_string(),
        ofile: None,
        dry_run: true,
    };
    let size = cli::run(&args).unwrap();
    assert_eq!(size, HEADER_SIZE as u64 + 2 * 2);
}

#[test]
fn cli_real_run_writes_expected_bytes() {
    let mut ifile = tempfile::NamedTempFile::new().unwrap();
    let data = make_fits(&[4, 3], -1.0, |c| (10 * c[1] + c[0]) as i16);
    ifile.write_all(&data).unwrap();
    let ofile = tempfile::NamedTempFile::new().unwrap();

    let args = Args {
        ifile: ifile.path().to_path_buf(),
        sel: "pbox=1:2,1:3".to_string(),
        ofile: Some(ofile.path().to_path_buf()),
        dry_run: false,
    };
    let size = cli::run(&args).unwrap();

    let written = std::fs::read(ofile.path()).unwrap();
    assert_eq!(written.len() as u64, size);
    assert_eq!(pixels16(&written), vec![11, 12]);
}
