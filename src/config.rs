//! Service configuration.
//!
//! Credentials and endpoints for the remote services come from the environment
//! (optionally via a `.env` file next to the binary's working directory).

use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, EXIT_INPUT};

pub const ENV_FIREBASE_API_KEY: &str = "PARCELS_FIREBASE_API_KEY";
pub const ENV_FIREBASE_PROJECT_ID: &str = "PARCELS_FIREBASE_PROJECT_ID";
pub const ENV_GEOCODE_API_KEY: &str = "PARCELS_GEOCODE_API_KEY";
pub const ENV_ORDER_CREATE_URL: &str = "PARCELS_ORDER_CREATE_URL";
pub const ENV_ORG_SELECTION: &str = "PARCELS_ORG_SELECTION";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "PARCELS_HTTP_TIMEOUT_SECS";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// What to do when a user is a member of more than one organization.
///
/// The membership query has no defined ordering, so picking one is only done
/// when explicitly asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrgSelection {
    /// Fail the run and list the candidate organizations.
    #[default]
    Reject,
    /// Use the first membership the query returned.
    First,
    /// Use the last membership the query returned.
    Last,
}

impl FromStr for OrgSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OrgSelection::Reject),
            "first" => Ok(OrgSelection::First),
            "last" => Ok(OrgSelection::Last),
            other => Err(format!(
                "Invalid {ENV_ORG_SELECTION} '{other}'. Expected one of: reject, first, last."
            )),
        }
    }
}

#[derive(Clone)]
pub struct ServiceConfig {
    pub firebase_api_key: String,
    pub firebase_project_id: String,
    pub geocode_api_key: String,
    pub order_create_url: String,
    pub org_selection: OrgSelection,
    pub http_timeout: Duration,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("firebase_project_id", &self.firebase_project_id)
            .field("order_create_url", &self.order_create_url)
            .field("org_selection", &self.org_selection)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let required = |key: &str| -> Result<String, AppError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::new(EXIT_INPUT, format!("Missing {key} in environment (.env).")))
        };

        let org_selection = match lookup(ENV_ORG_SELECTION) {
            Some(raw) if !raw.trim().is_empty() => raw
                .parse::<OrgSelection>()
                .map_err(|e| AppError::new(EXIT_INPUT, e))?,
            _ => OrgSelection::default(),
        };

        let timeout_secs = match lookup(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<u64>().map_err(|_| {
                AppError::new(
                    EXIT_INPUT,
                    format!("Invalid {ENV_HTTP_TIMEOUT_SECS} '{raw}'. Expected whole seconds."),
                )
            })?,
            _ => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            firebase_api_key: required(ENV_FIREBASE_API_KEY)?,
            firebase_project_id: required(ENV_FIREBASE_PROJECT_ID)?,
            geocode_api_key: required(ENV_GEOCODE_API_KEY)?,
            order_create_url: required(ENV_ORDER_CREATE_URL)?,
            org_selection,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
