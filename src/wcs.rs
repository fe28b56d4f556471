//! A thin wrapper around just enough of wcslib to resolve a `box=` selector
//! (world coordinates) into pixel indices.

use anyhow::{bail, Result};
use fitswcs_sys::wcslib;
use libc::{c_char, c_int};

#[derive(Debug)]
pub struct Wcs {
    handle: wcslib::WcsPrm,
    nwcs: c_int,
}

/// Our error handling is super lame.
macro_rules! try_wcslib {
    ($status:expr) => {{
        let s = $status;

        if s != 0 {
            bail!("wcslib error code {}", s);
        }
    }};
}

impl Wcs {
    /// Parse a FITS primary header's WCS keywords. `header` points at
    /// `nkeys` 80-byte cards (no trailing NUL required).
    pub unsafe fn new_raw(header: *const c_char, nkeys: c_int) -> Result<Self> {
        let mut handle: wcslib::WcsPrm = std::ptr::null_mut();
        let mut nreject: c_int = 0;
        let mut nwcs: c_int = 0;

        try_wcslib!(unsafe {
            // wcslib's signature takes a non-const pointer even though it
            // never writes through it.
            wcslib::wcspih(
                header as *mut c_char,
                nkeys,
                wcslib::WCSHDR_all as c_int,
                0,
                &mut nreject,
                &mut nwcs,
                &mut handle,
            )
        });

        // Am I supposed to have to set these manually? All the 9s wcslib
        // uses internally for naxis bookkeeping are there to avoid its own
        // axis-type inference getting in the way -- we only ever care about
        // the first two (spatial) axes of whatever cube we were handed.
        (*handle).lng = 0;
        (*handle).lat = 1;

        Ok(Wcs { handle, nwcs })
    }

    /// Convert a pair of world coordinates (as used by the `box=`
    /// selector's two corners) to 0-based pixel coordinates.
    pub fn world_to_pixel_pair(&mut self, world: [[f64; 2]; 2]) -> Result<[[f64; 2]; 2]> {
        const NELEM: c_int = 2;

        let world_flat = [world[0][0], world[0][1], world[1][0], world[1][1]];
        let mut phi = [0f64; 2];
        let mut theta = [0f64; 2];
        let mut imgcoord = [0f64; 4];
        let mut pixcoord = [0f64; 4];
        let mut stat = [0 as c_int; 2];

        try_wcslib!(unsafe {
            wcslib::wcss2p(
                self.handle,
                2,
                NELEM,
                world_flat.as_ptr(),
                phi.as_mut_ptr(),
                theta.as_mut_ptr(),
                imgcoord.as_mut_ptr(),
                pixcoord.as_mut_ptr(),
                stat.as_mut_ptr(),
            )
        });

        Ok([[pixcoord[0], pixcoord[1]], [pixcoord[2], pixcoord[3]]])
    }
}

impl Drop for Wcs {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe {
                wcslib::wcsvfree(&mut self.nwcs, &mut self.handle);
            }
            self.handle = std::ptr::null_mut();
        }
    }
}
