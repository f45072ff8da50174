// src/checker/http.rs
// =============================================================================
// This module checks if external URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server refuses HEAD (403 / 405)
// - Follows redirects automatically and judges the final status
// - Runs checks concurrently with a fixed upper bound
//
// Only failures are reported. A URL that answers below 400 on either
// attempt produces nothing.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Streams: For processing many items concurrently
// =============================================================================

use crate::audit::{Issue, IssueKind};
use crate::config::AuditConfig;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Why an external URL counts as dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "status", rename_all = "snake_case")]
pub enum FailureReason {
    /// The final response had a status of 400 or above.
    Status(u16),
    /// Timeout, DNS failure, refused connection, TLS failure...
    ConnectError,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::ConnectError => f.write_str("Connect Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalFailure {
    pub url: String,
    #[serde(flatten)]
    pub reason: FailureReason,
}

impl ExternalFailure {
    pub fn to_issue(&self) -> Issue {
        Issue::new(
            IssueKind::ExternalDead,
            format!("External link dead: {} ({})", self.url, self.reason),
        )
    }
}

/// Settings for the external checker.
#[derive(Debug, Clone)]
pub struct VerifierOptions {
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl From<&AuditConfig> for VerifierOptions {
    fn from(config: &AuditConfig) -> Self {
        VerifierOptions {
            concurrency: config.concurrency,
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

pub struct ExternalLinkVerifier {
    client: Client,
    concurrency: usize,
}

impl ExternalLinkVerifier {
    /// Builds the HTTP client once; every probe reuses it (connection pooling).
    pub fn new(options: &VerifierOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(options.user_agent.clone())
            .build()
            .context("failed to create HTTP client")?;

        Ok(ExternalLinkVerifier {
            client,
            concurrency: options.concurrency.max(1),
        })
    }

    /// Probes every URL and returns the dead ones, sorted by URL.
    ///
    /// At most `concurrency` probes are in flight at once. The function
    /// returns only after every probe has finished.
    pub async fn verify(&self, urls: &BTreeSet<String>) -> Vec<ExternalFailure> {
        if urls.is_empty() {
            return Vec::new();
        }
        info!("Checking {} external link(s)...", urls.len());

        let probes = urls.iter().map(|url| {
            let client = &self.client;
            async move {
                probe(client, url).await.map(|reason| ExternalFailure {
                    url: url.clone(),
                    reason,
                })
            }
        });

        // buffer_unordered finishes probes in any order; sort afterwards so
        // reports are identical between runs
        let mut failures: Vec<ExternalFailure> = stream::iter(probes)
            .buffer_unordered(self.concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .await;
        failures.sort_by(|a, b| a.url.cmp(&b.url));
        failures
    }
}

// Checks a single URL. None means it's alive.
async fn probe(client: &Client, url: &str) -> Option<FailureReason> {
    let status = match client.head(url).send().await {
        Ok(response) => response.status(),
        Err(e) => {
            debug!("HEAD {} failed: {}", url, e);
            return Some(FailureReason::ConnectError);
        }
    };

    if status.as_u16() < 400 {
        return None;
    }
    if !refuses_head(status) {
        return Some(FailureReason::Status(status.as_u16()));
    }

    // Some servers reject HEAD outright; ask again with a GET. The body is
    // never read, the response is dropped as soon as we have the status.
    match client.get(url).send().await {
        Ok(response) if response.status().as_u16() < 400 => None,
        Ok(response) => Some(FailureReason::Status(response.status().as_u16())),
        Err(e) => {
            debug!("GET {} failed: {}", url, e);
            Some(FailureReason::ConnectError)
        }
    }
}

fn refuses_head(status: StatusCode) -> bool {
    matches!(status, StatusCode::METHOD_NOT_ALLOWED | StatusCode::FORBIDDEN)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is StreamExt and buffer_unordered?
//    - StreamExt is a trait (like an interface) that adds methods to streams
//    - buffer_unordered(N) runs up to N futures concurrently
//    - It's like Promise.all() but with a concurrency limit
//
// 2. Why no Mutex around the results?
//    - Each probe only returns its own result
//    - .collect() gathers them after the fact, so nothing is shared while
//      the probes run
//
// 3. Why is everything a ConnectError when send() fails?
//    - From the site owner's point of view a timeout, a DNS failure and a
//      refused connection all mean the same thing: visitors can't get there
// -----------------------------------------------------------------------------
