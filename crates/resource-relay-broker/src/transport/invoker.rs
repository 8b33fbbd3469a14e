// crates/resource-relay-broker/src/transport/invoker.rs
// ============================================================================
// Module: HTTP Function Invoker
// Description: Synchronous chained invocation over an HTTP invoke endpoint.
// Purpose: Re-invoke the running function as a chained child.
// Dependencies: reqwest, resource-relay-core, serde_json, url
// ============================================================================

//! ## Overview
//! [`HttpFunctionInvoker`] POSTs the chained payload to a function invoke
//! endpoint and waits for the reply. Each call builds a client with the
//! per-invocation connect and read timeouts and issues exactly one request.
//!
//! Status mapping: `403` is permission denied, `429` is throttling, `400` is
//! a rejected request. A reply carrying [`FUNCTION_ERROR_HEADER`] reports a
//! child function error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use resource_relay_core::ChainTimeouts;
use resource_relay_core::ChildOutcome;
use resource_relay_core::FunctionInvoker;
use resource_relay_core::InvokeError;
use serde_json::Value;
use url::Url;

use crate::transport::BrokerError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Response header marking an application-level function error.
pub const FUNCTION_ERROR_HEADER: &str = "X-Amz-Function-Error";

/// Field carrying the error text in a function error body.
const ERROR_MESSAGE_FIELD: &str = "errorMessage";

// ============================================================================
// SECTION: Invoker
// ============================================================================

/// Function invoker backed by blocking HTTP requests.
///
/// # Invariants
/// - `endpoint` is an absolute `http` or `https` URL.
/// - No retries are performed.
#[derive(Debug, Clone)]
pub struct HttpFunctionInvoker {
    /// Invoke endpoint for the running function.
    endpoint: Url,
}

impl HttpFunctionInvoker {
    /// Creates an invoker targeting `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::InvalidEndpoint`] when the URL does not parse or
    /// is not HTTP(S).
    pub fn new(endpoint: &str) -> Result<Self, BrokerError> {
        let endpoint =
            Url::parse(endpoint).map_err(|err| BrokerError::InvalidEndpoint(err.to_string()))?;
        match endpoint.scheme() {
            "http" | "https" => Ok(Self {
                endpoint,
            }),
            scheme => Err(BrokerError::InvalidEndpoint(format!("unsupported scheme {scheme}"))),
        }
    }

    /// Returns the invoke endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl FunctionInvoker for HttpFunctionInvoker {
    fn invoke_child(
        &self,
        payload: &Value,
        timeouts: ChainTimeouts,
    ) -> Result<ChildOutcome, InvokeError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.read)
            .build()
            .map_err(|err| InvokeError::Unknown(err.to_string()))?;
        let body = serde_json::to_vec(payload).map_err(|err| InvokeError::Unknown(err.to_string()))?;
        tracing::debug!(
            endpoint = %self.endpoint,
            read_ms = u64::try_from(timeouts.read.as_millis()).unwrap_or(u64::MAX),
            "invoking chained child"
        );
        let response = client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| send_error(&err, timeouts))?;

        let status = response.status();
        let function_error = response.headers().contains_key(FUNCTION_ERROR_HEADER);
        let text = response.text().map_err(|err| send_error(&err, timeouts))?;
        match status {
            StatusCode::FORBIDDEN => return Err(InvokeError::PermissionDenied(text)),
            StatusCode::TOO_MANY_REQUESTS => return Err(InvokeError::Throttled(text)),
            StatusCode::BAD_REQUEST => return Err(InvokeError::BadRequest(text)),
            status if !status.is_success() => {
                return Err(InvokeError::Unknown(format!("http status {status}: {text}")));
            }
            _ => {}
        }
        if function_error {
            return Ok(ChildOutcome::FunctionError(error_message(&text)));
        }
        Ok(ChildOutcome::Completed(parse_body(&text)))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classifies a request failure.
fn send_error(err: &reqwest::Error, timeouts: ChainTimeouts) -> InvokeError {
    if err.is_connect() {
        InvokeError::ConnectionFailure(err.to_string())
    } else if err.is_timeout() {
        InvokeError::ReadTimeout(timeouts.read)
    } else {
        InvokeError::Unknown(err.to_string())
    }
}

/// Extracts the error text from a function error body.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| value.get(ERROR_MESSAGE_FIELD).and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}

/// Parses a reply body; empty bodies are `null`, non-JSON bodies are strings.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
