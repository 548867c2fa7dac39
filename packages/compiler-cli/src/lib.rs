#![deny(clippy::all)]

//! CLI plumbing around the compiler and frontend crates: project config
//! loading, a small logger abstraction, and the build driver the
//! `udonc` binary calls into.

pub mod config;
pub mod driver;
pub mod logging;
pub mod uasm_writer;

/// CLI version, read from this crate's own manifest.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
