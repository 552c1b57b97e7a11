//! `parcel-importer` library crate.
//!
//! The binary (`parcels`) is a thin wrapper around this library so that:
//!
//! - the pipeline is testable without spawning processes or touching the network
//! - every remote service can be swapped for a test double

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod remote;
pub mod report;
pub mod submit;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;
