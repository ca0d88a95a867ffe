use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use roster_types::api::{ErrorCode, Response};

/// HTTP method accepted by the dispatcher. Closed set: an unsupported
/// method is unrepresentable rather than a runtime fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Issues one outbound request per call and normalizes whatever happens
/// into a [`Response`] envelope. No retries, no caching; the timeout is a
/// hard upper bound on the whole dispatch, reply body included.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    http: reqwest::Client,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    pub async fn dispatch<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> Response<T> {
        debug!(%url, method = method.as_str(), "dispatching request");

        match tokio::time::timeout(self.timeout, self.send(url, method, headers, body)).await {
            Ok(resp) => resp,
            Err(_) => {
                warn!(%url, timeout_ms = self.timeout.as_millis() as u64, "request timed out");
                Response::failure(
                    ErrorCode::Timeout,
                    format!(
                        "request to {} timed out after {} ms",
                        url,
                        self.timeout.as_millis()
                    ),
                )
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: &str,
        method: Method,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> Response<T> {
        let mut request = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%url, error = %e, "transport failure");
                return Response::failure(
                    ErrorCode::NetworkError,
                    format!("request to {} failed: {}", url, e),
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            return normalize_failure(url, status, response).await;
        }

        // Some backends reply to DELETE with 204 and no body; treat that
        // as a JSON null rather than a parse failure.
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(%url, error = %e, "failed to read reply body");
                return Response::failure(
                    ErrorCode::NetworkError,
                    format!("failed to read reply from {}: {}", url, e),
                );
            }
        };
        let payload = if text.trim().is_empty() { "null" } else { &text };

        match serde_json::from_str::<T>(payload) {
            Ok(data) => Response::ok(data),
            Err(e) => {
                warn!(%url, error = %e, "malformed reply payload");
                Response::failure(
                    ErrorCode::NetworkError,
                    format!("malformed reply from {}: {}", url, e),
                )
            }
        }
    }
}

/// Classify a non-2xx reply. A roster-aware backend answers with its own
/// envelope; its code and message pass through untouched. Otherwise 404
/// means the addressed resource does not exist, and everything else is a
/// transport-level failure.
async fn normalize_failure<T>(
    url: &str,
    status: reqwest::StatusCode,
    response: reqwest::Response,
) -> Response<T> {
    let body = response.text().await.unwrap_or_default();
    warn!(%url, status = status.as_u16(), "server returned failure");

    if let Ok(envelope) = serde_json::from_str::<Response<Value>>(&body) {
        if let Some(code) = envelope.error_code {
            return Response::failure(code, envelope.message);
        }
    }

    let code = if status == reqwest::StatusCode::NOT_FOUND {
        ErrorCode::NotFound
    } else {
        ErrorCode::NetworkError
    };
    Response::failure(code, format!("{} returned {}: {}", url, status, body))
}
