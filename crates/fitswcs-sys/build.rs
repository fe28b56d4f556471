//! Locates a system-installed wcslib via pkg-config and generates bindings
//! for the slice of its API the slicing engine needs with `bindgen`.
//!
//! Unlike the donor codebase this is descended from, this crate does not
//! vendor and build wcslib (and cfitsio) from source: it expects the
//! `wcslib` development package (providing `wcslib.pc` and the
//! `wcslib/wcshdr.h` header) to already be installed on the build host.

use std::{env, path::PathBuf};

fn main() {
    let lib = match pkg_config::Config::new().atleast_version("7").probe("wcslib") {
        Ok(lib) => lib,

        Err(e) => {
            // Some distros ship wcslib without a .pc file. Fall back to a
            // bare link directive and hope the header is on the default
            // include path; if that's wrong too, the build fails with a
            // clear "wcslib/wcshdr.h not found" or "-lwcs" error.
            eprintln!("pkg-config probe for wcslib failed ({e}); falling back to -lwcs");
            println!("cargo:rustc-link-lib=wcs");
            Default::default()
        }
    };

    let mut builder = bindgen::Builder::default()
        .header("wrapper.h")
        .allowlist_function("wcspih")
        .allowlist_function("wcsp2s")
        .allowlist_function("wcss2p")
        .allowlist_function("wcsfree")
        .allowlist_function("wcsvfree")
        .allowlist_var("WCSHDR_.*")
        .derive_debug(true);

    for path in &lib.include_paths {
        builder = builder.clang_arg(format!("-I{}", path.display()));
    }

    let bindings = builder.generate().expect("failed to generate wcslib bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").unwrap());
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("failed to write wcslib bindings");
}
