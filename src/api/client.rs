//! HTTP core shared by every entity family: request construction against
//! the configured endpoint, response decoding, the error taxonomy, and the
//! connectivity probe. Every operation is a single attempt; the surrounding
//! controller decides whether to retry via a user-initiated refresh.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the remote resource client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server responded with a non-success status and a decodable
    /// `{message}` body. The message is surfaced to the user verbatim.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No usable response was obtained: transport failure, or an error
    /// response whose body could not be decoded.
    #[error("Cannot reach the backend. Check API configuration.")]
    Connectivity,

    /// The action exists in the UI but has no backend endpoint.
    #[error("{0} is not supported by the backend")]
    Unsupported(&'static str),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Outcome of the connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Online,
    Offline,
    Error,
}

impl ApiStatus {
    pub fn text(&self) -> &'static str {
        match self {
            ApiStatus::Online => "API Online",
            ApiStatus::Offline => "API Offline",
            ApiStatus::Error => "API Error",
        }
    }

    pub fn detail(&self) -> &'static str {
        match self {
            ApiStatus::Online => "Connected successfully",
            ApiStatus::Offline => "Cannot connect to backend",
            ApiStatus::Error => "Server error occurred",
        }
    }
}

/// Error payload shape the backend uses for non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Wraps one `reqwest` client plus the configured base URL. The blocking
/// client is reused across calls; swapping the endpoint keeps it alive.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize_endpoint(endpoint),
        }
    }

    /// Point the client at a different backend, e.g. after the user saves a
    /// new endpoint in the config screen.
    pub fn set_endpoint(&mut self, endpoint: &str) {
        self.base_url = normalize_endpoint(endpoint);
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    /// Issue a lightweight read to classify backend reachability. Never
    /// fails: transport errors map to `Offline`, an error response maps to
    /// `Error`.
    pub fn check(&self) -> ApiStatus {
        let url = self.url("books");
        match self.http.get(url).query(&[("page", "1"), ("limit", "1")]).send() {
            Ok(response) if response.status().is_success() => ApiStatus::Online,
            Ok(_) => ApiStatus::Error,
            Err(_) => ApiStatus::Offline,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        decode(response)
    }

    pub(crate) fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        decode(response)
    }

    pub(crate) fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        decode(response)
    }

    pub(crate) fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .http
            .put(self.url(path))
            .json(body)
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        decode(response)
    }

    pub(crate) fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self
            .http
            .put(self.url(path))
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        decode(response)
    }

    pub(crate) fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self
            .http
            .delete(self.url(path))
            .send()
            .map_err(|_| ApiError::Connectivity)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response))
        }
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    if response.status().is_success() {
        response.json().map_err(|_| ApiError::Connectivity)
    } else {
        Err(error_from_response(response))
    }
}

fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.bytes().map(|b| b.to_vec()).unwrap_or_default();
    error_from_parts(status, &body)
}

/// Map a non-success status plus raw body onto the error taxonomy. An error
/// body that does not decode to `{message}` counts as a connectivity-class
/// failure.
fn error_from_parts(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Server {
            status,
            message: parsed.message,
        },
        Err(_) => ApiError::Connectivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_duplicate_slashes() {
        let client = ApiClient::new("http://localhost:4000/api/");
        assert_eq!(client.url("books"), "http://localhost:4000/api/books");
        assert_eq!(client.url("/books/42"), "http://localhost:4000/api/books/42");
    }

    #[test]
    fn set_endpoint_swaps_the_base() {
        let mut client = ApiClient::new("http://a/api");
        client.set_endpoint(" http://b/api/ ");
        assert_eq!(client.endpoint(), "http://b/api");
    }

    #[test]
    fn decodable_error_body_becomes_a_server_error() {
        let err = error_from_parts(409, br#"{"message":"ISBN already exists"}"#);
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "ISBN already exists");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_or_malformed_error_body_is_connectivity_class() {
        assert!(matches!(error_from_parts(500, b""), ApiError::Connectivity));
        assert!(matches!(
            error_from_parts(502, b"<html>bad gateway</html>"),
            ApiError::Connectivity
        ));
    }

    #[test]
    fn probe_against_unreachable_endpoint_is_offline_not_error() {
        // Port 9 (discard) is not served on loopback, so the TCP connect
        // fails before any HTTP exchange.
        let client = ApiClient::new("http://127.0.0.1:9/api");
        assert_eq!(client.check(), ApiStatus::Offline);
    }
}
