//! The small subset of wcslib's API that we need, generated by `bindgen`
//! from the system's `<wcslib/wcshdr.h>` at build time.
//!
//! We bindgen this rather than hand-declaring an `extern "C"` block because
//! `struct wcsprm` is a large, version-sensitive public struct (we need to
//! poke its `lng`/`lat` fields directly -- see `Wcs::new_raw` in the
//! engine's `wcs` module) and hand-copying its field layout would be a
//! silent way to corrupt memory the moment wcslib's ABI drifted.

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

/// Alias matching the donor codebase's naming: a pointer to a single
/// `wcsprm` record (as opposed to the array of `nwcs` records that
/// `wcspih` actually allocates).
pub type WcsPrm = *mut wcsprm;
