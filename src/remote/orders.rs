//! Ordering service client.

use reqwest::StatusCode;
use reqwest::blocking::Client;

use crate::config::ServiceConfig;
use crate::domain::OrderPayload;
use crate::error::SubmissionError;
use crate::remote::{OrderService, body_text};

pub struct HttpOrderService {
    client: Client,
    create_url: String,
}

impl HttpOrderService {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            create_url: config.order_create_url.clone(),
        }
    }
}

impl OrderService for HttpOrderService {
    fn create_order(&self, token: &str, payload: &OrderPayload) -> Result<serde_json::Value, SubmissionError> {
        let resp = self
            .client
            .post(&self.create_url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        // Only 201 Created counts; a 200 means the service did something else.
        if resp.status() != StatusCode::CREATED {
            return Err(SubmissionError::Status {
                status: resp.status().as_u16(),
                body: body_text(resp),
            });
        }

        resp.json().map_err(|e| SubmissionError::Decode(e.to_string()))
    }
}
