//! Error types.
//!
//! `AppError` is the fatal, run-aborting error the binary turns into an exit code.
//! The stage errors below are what the collaborators return; per-record ones are
//! caught by the pipeline and never reach `AppError`.

use thiserror::Error;

/// Exit code for usage, configuration, and input-file problems.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when the credentials could not be exchanged for a principal.
pub const EXIT_AUTH: u8 = 3;
/// Exit code when the organization's warehouses could not be loaded.
pub const EXIT_WAREHOUSES: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Credentials could not be exchanged for a principal. Fatal.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthenticationError {
    #[error("sign-in rejected: {0}")]
    Rejected(String),

    #[error("sign-in request failed: {0}")]
    Transport(String),

    #[error("malformed sign-in response: {0}")]
    Decode(String),
}

impl From<AuthenticationError> for AppError {
    fn from(err: AuthenticationError) -> Self {
        AppError::new(EXIT_AUTH, format!("Authentication failed: {err}"))
    }
}

/// The warehouse snapshot could not be loaded. Fatal.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WarehouseLookupError {
    #[error("user {0} does not belong to any organization")]
    NoOrganization(String),

    #[error("user {uid} belongs to several organizations ({}); set PARCELS_ORG_SELECTION to first or last", .org_ids.join(", "))]
    AmbiguousOrganization { uid: String, org_ids: Vec<String> },

    #[error("document store request failed: {0}")]
    Transport(String),

    #[error("document store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed warehouse document: {0}")]
    Decode(String),
}

impl From<WarehouseLookupError> for AppError {
    fn from(err: WarehouseLookupError) -> Self {
        AppError::new(EXIT_WAREHOUSES, format!("Warehouse lookup failed: {err}"))
    }
}

/// A row that could not be turned into a typed record. Drops the row.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecordError {
    #[error("CSV parse error: {0}")]
    Csv(String),

    #[error("missing value for column `{0}`")]
    MissingField(String),

    #[error("column `{column}` must be a non-negative integer, got {value:?}")]
    InvalidNumber { column: String, value: String },
}

/// The geocoder could not resolve an address.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeocodingError {
    #[error("no geocoding results for {0:?}")]
    NoResults(String),

    #[error("geocoder returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("geocoding request failed: {0}")]
    Transport(String),
}

/// Per-record transformation failure. Drops the record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransformError {
    #[error("pickup warehouse {0} doesn't exist in the organization")]
    UnresolvedWarehouse(String),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
}

/// Per-record submission failure. Logged; the batch continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmissionError {
    #[error("ordering service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("order request failed: {0}")]
    Transport(String),

    #[error("malformed order response: {0}")]
    Decode(String),
}
