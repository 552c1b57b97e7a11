//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads service configuration
//! - opens the input file (header problems are reported before any network call)
//! - builds the remote clients and runs the import pipeline
//! - prints the run summary

use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::config::ServiceConfig;
use crate::error::AppError;
use crate::io::ingest::RecordReader;
use crate::remote::{FirebaseAuthenticator, FirestoreDirectory, GoogleGeocoder, HttpOrderService};

pub mod pipeline;

/// Entry point for the `parcels` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    crate::logging::init();

    let config = ServiceConfig::from_env()?;
    let records = RecordReader::open(&cli.input)?;
    info!(input = %cli.input.display(), "reading shipments");

    let http = crate::remote::http_client(config.http_timeout)?;
    let authenticator = FirebaseAuthenticator::new(http.clone(), &config);
    let directory = FirestoreDirectory::new(http.clone(), &config);
    let geocoder = GoogleGeocoder::new(http.clone(), &config);
    let orders = HttpOrderService::new(http, &config);

    let services = pipeline::Services {
        authenticator: &authenticator,
        directory: &directory,
        geocoder: &geocoder,
        orders: &orders,
    };
    let credentials = pipeline::Credentials {
        identifier: cli.identifier,
        secret: cli.secret,
    };

    let report = pipeline::run_import(&services, &credentials, records)?;

    println!("{}", crate::report::format_report(&report));
    println!("Finished!");
    Ok(())
}
