//! Command-line parsing.
//!
//! The binary takes four positional arguments and no flags:
//!
//! `parcels <EMAIL> <PASSWORD> <RESERVED> <CSV>`
//!
//! The third slot is kept so existing invocations keep working; its value is ignored.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "parcels",
    version,
    about = "Import parcel shipments from a CSV file and create orders for them"
)]
pub struct Cli {
    /// Account email used to sign in.
    #[arg(value_name = "EMAIL")]
    pub identifier: String,

    /// Account password.
    #[arg(value_name = "PASSWORD")]
    pub secret: String,

    /// Reserved; accepted and ignored.
    #[arg(value_name = "RESERVED")]
    pub reserved: String,

    /// Shipment CSV file (first row is the header).
    #[arg(value_name = "CSV")]
    pub input: PathBuf,
}
