//! Argument parsing and dispatch for the `fits-slice` binary, factored out
//! of `main` so integration tests can drive it directly instead of
//! spawning a subprocess.

use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use memmap2::Mmap;

/// Slice a rectangular (or hyper-rectangular) region out of a FITS image.
#[derive(Parser, Debug)]
#[command(name = "fits-slice", version, about)]
pub struct Args {
    /// Input FITS file.
    pub ifile: PathBuf,

    /// Selector, e.g. `pbox=y1:y2,x1:x2` or `box=dec1:dec2,ra1:ra2`.
    pub sel: String,

    /// Output FITS file. Not read when `--dry-run` is given.
    pub ofile: Option<PathBuf>,

    /// Only compute and print the output size; write nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Run one slice according to `args`, returning the output byte count.
pub fn run(args: &Args) -> anyhow::Result<u64> {
    let ifile = File::open(&args.ifile)?;
    let mmap = unsafe { Mmap::map(&ifile)? };

    if args.dry_run {
        let size = crate::slice_fits(&mmap, Some(args.sel.as_str()), None)?;
        return Ok(size);
    }

    let ofile = args
        .ofile
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("an output file is required unless --dry-run is given"))?;
    let mut ofile = File::create(ofile)?;
    let size = crate::slice_fits(&mmap, Some(args.sel.as_str()), Some(&mut ofile))?;
    Ok(size)
}
