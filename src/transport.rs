use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Form body posted to the subscription endpoint. The handler reads the
/// fingerprint from the `fingerprint` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(rename = "fingerprint")]
    pub browser_fingerprint: String,
}

/// JSON reply from the subscription endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
}

/// How a subscription request reaches the backend.
#[async_trait(?Send)]
pub trait SubscribeTransport {
    async fn subscribe(&self, req: &SubscribeRequest) -> Result<SubscribeResponse, TransportError>;
}

/// `reqwest`-backed transport posting a form-encoded body.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// `endpoint` may be a path (joined onto `base_url`) or an absolute URL.
    pub fn new(base_url: &str, endpoint: &str) -> Result<Self, TransportError> {
        let base = url::Url::parse(base_url)
            .map_err(|e| TransportError(format!("invalid base URL '{}': {}", base_url, e)))?;
        let url = base
            .join(endpoint)
            .map_err(|e| TransportError(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        Ok(HttpTransport {
            client: reqwest::Client::new(),
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The form-encoded POST for `req`.
    pub fn build_request(&self, req: &SubscribeRequest) -> Result<reqwest::Request, TransportError> {
        self.client
            .post(&self.url)
            .form(req)
            .build()
            .map_err(|e| TransportError(format!("subscribe request invalid: {}", e)))
    }
}

#[async_trait(?Send)]
impl SubscribeTransport for HttpTransport {
    async fn subscribe(&self, req: &SubscribeRequest) -> Result<SubscribeResponse, TransportError> {
        log::debug!("[subscribe] POST {}", self.url);
        let request = self.build_request(req)?;
        let resp = self
            .client
            .execute(request)
            .await
            .map_err(|e| TransportError(format!("subscribe request failed: {}", e)))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(format!("subscribe response unreadable: {}", e)))?;
        read_response(status, &body)
    }
}

/// The backend answers validation failures with a JSON body and a 4xx status,
/// so a parsable body wins over the status code.
pub fn read_response(status: StatusCode, body: &str) -> Result<SubscribeResponse, TransportError> {
    match parse_response(body) {
        Ok(parsed) => Ok(parsed),
        Err(e) if status.is_success() => Err(e),
        Err(_) => Err(TransportError(format!("subscribe returned {}", status))),
    }
}

pub fn parse_response(body: &str) -> Result<SubscribeResponse, TransportError> {
    serde_json::from_str(body)
        .map_err(|e| TransportError(format!("subscribe JSON parse error: {}", e)))
}
