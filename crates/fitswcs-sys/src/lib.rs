//! A lame "sys" crate providing just enough bindings to [wcslib] to meet the
//! needs of the slicing engine's `box=` selector.
//!
//! [wcslib]: https://www.atnf.csiro.au/people/mcalabre/WCS/

pub mod wcslib;
