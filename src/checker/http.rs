// src/checker/http.rs
// =============================================================================
// This module checks if bookmark URLs are alive by making HTTP requests.
//
// Key functionality:
// - The Probe trait: "given a URL, tell me the status code or why it failed"
// - HttpProbe: the real implementation, built on reqwest
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Detects the various failure modes (timeout, DNS, TLS, bad URL, ...)
//
// The worker pool only talks to the Probe trait, so tests can swap in a fake
// probe and never touch the network.
//
// Rust concepts:
// - Traits: a shared interface that several types can implement
// - async-trait: lets trait methods be async (and the trait object-safe)
// - Enums: To represent the different outcomes of a probe
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::error::Error as _;
use std::fmt;
use std::time::Duration;
use url::Url;

// Why a probe failed to produce a status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ProbeFailure {
    /// The bookmark's URL could not be parsed at all
    MalformedUrl(String),
    /// Parsed fine, but it's not something we can HEAD (javascript:, place:, ...)
    UnsupportedScheme(String),
    /// No answer within the probe timeout
    Timeout,
    /// Could not resolve hostname
    Dns,
    /// Host unreachable, connection refused, reset, ...
    Connect,
    /// SSL/TLS certificate error
    Tls,
    /// Anything else
    Other(String),
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::MalformedUrl(e) => write!(f, "malformed URL: {}", e),
            ProbeFailure::UnsupportedScheme(s) => write!(f, "unsupported scheme '{}'", s),
            ProbeFailure::Timeout => write!(f, "request timed out"),
            ProbeFailure::Dns => write!(f, "could not resolve hostname"),
            ProbeFailure::Connect => write!(f, "connection failed"),
            ProbeFailure::Tls => write!(f, "SSL certificate error"),
            ProbeFailure::Other(e) => write!(f, "{}", e),
        }
    }
}

// What a single probe came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered with this HTTP status code
    Status(u16),
    /// No status code: the request itself failed
    Failed(ProbeFailure),
}

impl ProbeOutcome {
    // A link is valid only when the server answered with a status below 400.
    // Every failure counts as invalid.
    pub fn is_valid(&self) -> bool {
        matches!(self, ProbeOutcome::Status(code) if *code < 400)
    }

    // Human-readable reason for an invalid outcome, None for a valid one.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            ProbeOutcome::Status(code) if *code < 400 => None,
            ProbeOutcome::Status(code) => Some(format!("HTTP {}", code)),
            ProbeOutcome::Failed(failure) => Some(failure.to_string()),
        }
    }
}

/// Anything that can tell whether a URL exists.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// The real network probe: one HEAD request per URL.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    // Creates the probe with its own reqwest client.
    //
    // The client is reused for every request (connection pooling) and is
    // cheap to clone, it's a reference counter internally.
    //
    // Redirects are not followed: a 3xx answer means the bookmark still
    // exists, whatever the target says.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("bookmark-guardian/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let parsed = match parse_probe_url(url) {
            Ok(parsed) => parsed,
            Err(failure) => return ProbeOutcome::Failed(failure),
        };

        match self.client.head(parsed).send().await {
            Ok(response) => ProbeOutcome::Status(response.status().as_u16()),
            Err(e) => ProbeOutcome::Failed(categorize_error(e)),
        }
    }
}

// Validates a bookmark URL before we spend a request on it.
fn parse_probe_url(url: &str) -> Result<Url, ProbeFailure> {
    let parsed =
        Url::parse(url.trim()).map_err(|e| ProbeFailure::MalformedUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ProbeFailure::UnsupportedScheme(other.to_string())),
    }
}

// Categorizes different error types from reqwest
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - etc.
fn categorize_error(error: reqwest::Error) -> ProbeFailure {
    // The interesting part (hyper/rustls/dns) lives in the source chain,
    // not in reqwest's own message
    let error_string = source_chain(&error).to_lowercase();

    if error.is_timeout() {
        ProbeFailure::Timeout
    } else if error_string.contains("certificate") || error_string.contains("tls") {
        ProbeFailure::Tls
    } else if error.is_connect() {
        // Connection errors often mean DNS issues or host unreachable
        if error_string.contains("dns") || error_string.contains("resolve") {
            ProbeFailure::Dns
        } else {
            ProbeFailure::Connect
        }
    } else {
        ProbeFailure::Other(error.to_string())
    }
}

fn source_chain(error: &reqwest::Error) -> String {
    let mut chain = String::new();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push_str(&cause.to_string());
        chain.push_str(": ");
        source = cause.source();
    }
    chain
}
