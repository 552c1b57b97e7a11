//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the typed input row (`RawRecord`) and its parts
//! - warehouses and postal addresses (`Warehouse`, `PostalAddress`)
//! - the order sent to the ordering service (`OrderPayload`)
//! - the authenticated identity for a run (`Principal`)

pub mod types;

pub use types::*;
