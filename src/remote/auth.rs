//! Email/password sign-in against the Firebase identity toolkit.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::ServiceConfig;
use crate::domain::Principal;
use crate::error::AuthenticationError;
use crate::remote::{Authenticator, body_text};

const BASE_URL: &str = "https://identitytoolkit.googleapis.com";

pub struct FirebaseAuthenticator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FirebaseAuthenticator {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            api_key: config.firebase_api_key.clone(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (e.g. the auth emulator).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn sign_in_url(&self) -> String {
        format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        )
    }
}

impl Authenticator for FirebaseAuthenticator {
    #[instrument(skip(self, secret))]
    fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthenticationError> {
        let resp = self
            .client
            .post(self.sign_in_url())
            .json(&SignInRequest {
                email: identifier,
                password: secret,
                return_secure_token: true,
            })
            .send()
            .map_err(|e| AuthenticationError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = body_text(resp);
            return Err(AuthenticationError::Rejected(rejection_message(status.as_u16(), &body)));
        }

        let body: SignInResponse = resp
            .json()
            .map_err(|e| AuthenticationError::Decode(e.to_string()))?;
        debug!(uid = %body.local_id, "signed in");

        Ok(Principal {
            uid: body.local_id,
            token: body.id_token,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// The provider's error code (e.g. `INVALID_PASSWORD`) when the body carries one.
fn rejection_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => env.error.message,
        Err(_) => format!("status {status}: {body}"),
    }
}
