//! HTTP fetch collaborator
//!
//! The only network boundary of the library: a GET that decodes a JSON body.
//! Providers depend on the [`Fetch`] trait, so tests substitute canned
//! payloads without a socket. Transport failures, non-2xx statuses, and
//! undecodable bodies are classified separately; nothing is retried here.

use crate::error::{Error, Result};
use serde_json::Value;
use std::io::Read;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default bound on a response body
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 1024 * 1024;

const USER_AGENT: &str = concat!("whereabouts/", env!("CARGO_PKG_VERSION"));

/// Performs a GET and returns the decoded JSON body
pub trait Fetch: Send + Sync {
    /// Fetch `url` with `params` appended as the query string and `headers`
    /// set on the request
    fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Value>;
}

/// Blocking reqwest-backed fetcher with bounded timeout and body size
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_response_bytes: u64,
}

impl HttpFetcher {
    /// Create a fetcher with explicit bounds
    pub fn new(timeout: Duration, max_response_bytes: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            max_response_bytes,
        })
    }

    /// Create a fetcher with the default bounds
    pub fn with_defaults() -> Result<Self> {
        Self::new(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            DEFAULT_MAX_RESPONSE_BYTES,
        )
    }
}

impl Fetch for HttpFetcher {
    fn fetch_json(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: &[(&str, String)],
    ) -> Result<Value> {
        let start = Instant::now();
        debug!("GET {url}");

        let mut request = self.client.get(url).query(params);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        let response = request.send()?;
        let status = response.status();

        if !status.is_success() {
            // Carry whatever diagnostic body the vendor sent, bounded
            let body = read_bounded(response, self.max_response_bytes)
                .ok()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            warn!("GET {url} failed with status {status}");
            return Err(Error::upstream(
                status.as_u16(),
                body.chars().take(512).collect::<String>(),
            ));
        }

        let bytes = read_bounded(response, self.max_response_bytes)?;
        let value: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::malformed(format!("undecodable JSON body: {e}")))?;

        debug!(
            "GET {url} -> {} bytes in {:.3}s",
            bytes.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(value)
    }
}

fn read_bounded(response: reqwest::blocking::Response, max: u64) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    response
        .take(max + 1)
        .read_to_end(&mut body)
        .map_err(|e| Error::Transport(format!("reading response body: {e}")))?;
    if body.len() as u64 > max {
        return Err(Error::malformed(format!(
            "response body exceeded the {max}-byte limit"
        )));
    }
    Ok(body)
}

#[cfg(test)]
pub(crate) mod stub {
    //! Canned-response fetcher used across provider tests

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Maps a URL substring to a canned JSON payload or error status
    pub struct StubFetcher {
        routes: Vec<(String, std::result::Result<Value, u16>)>,
        pub calls: Mutex<Vec<(String, HashMap<String, String>)>>,
    }

    impl StubFetcher {
        pub fn new() -> Self {
            Self {
                routes: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Serve `payload` for any URL containing `fragment`
        pub fn route(mut self, fragment: &str, payload: Value) -> Self {
            self.routes.push((fragment.to_string(), Ok(payload)));
            self
        }

        /// Serve an HTTP error status for any URL containing `fragment`
        pub fn route_status(mut self, fragment: &str, status: u16) -> Self {
            self.routes.push((fragment.to_string(), Err(status)));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Fetch for StubFetcher {
        fn fetch_json(
            &self,
            url: &str,
            params: &[(&str, String)],
            _headers: &[(&str, String)],
        ) -> Result<Value> {
            self.calls.lock().unwrap().push((
                url.to_string(),
                params
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), v.clone()))
                    .collect(),
            ));
            for (fragment, outcome) in &self.routes {
                if url.contains(fragment.as_str()) {
                    return match outcome {
                        Ok(payload) => Ok(payload.clone()),
                        Err(status) => Err(Error::upstream(*status, "stubbed failure")),
                    };
                }
            }
            Err(Error::Transport(format!("no stub route for {url}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_construction() {
        let fetcher = HttpFetcher::with_defaults();
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_stub_routes_and_records_calls() {
        use stub::StubFetcher;

        let fetcher = StubFetcher::new()
            .route("example.com/ok", serde_json::json!({"status": "fine"}))
            .route_status("example.com/denied", 403);

        let ok = fetcher
            .fetch_json("https://example.com/ok", &[("q", "x".to_string())], &[])
            .unwrap();
        assert_eq!(ok["status"], "fine");

        let err = fetcher.fetch_json("https://example.com/denied", &[], &[]);
        assert!(matches!(err, Err(Error::Upstream { status: 403, .. })));

        let err = fetcher.fetch_json("https://example.com/unrouted", &[], &[]);
        assert!(matches!(err, Err(Error::Transport(_))));

        assert_eq!(fetcher.call_count(), 3);
    }
}
