//! HTTP status waiter.

use anyhow::Context;
use regex::Regex;
use reqwest::blocking::Client;

use crate::config::{StatusPattern, Target};
use crate::error::Result;

use super::{ProbeError, ProbeResult, Waiter};

/// Ready once a GET request returns an accepted status code.
///
/// Each request is bounded by the target's `http_client_timeout`, not by its
/// overall retry deadline.
#[derive(Debug, Clone)]
pub struct HttpWaiter {
    client: Client,
}

impl HttpWaiter {
    /// Create a waiter with its own HTTP client.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Waiter for HttpWaiter {
    fn probe(&self, name: &str, target: &Target) -> ProbeResult {
        let response = self
            .client
            .get(&target.address)
            .timeout(target.http_client_timeout)
            .send()
            .map_err(|e| ProbeError::transient(format!("could not connect to {name}: {e}")))?;

        check_status(name, &target.status_pattern, response.status().as_u16())
    }
}

/// Whether `code` is in the 2xx range.
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Decide whether `code` satisfies `pattern`.
///
/// A pattern that is not a valid regular expression is a permanent failure,
/// whatever the code.
pub fn check_status(name: &str, pattern: &StatusPattern, code: u16) -> ProbeResult {
    match pattern {
        StatusPattern::SuccessRange => {
            if is_success(code) {
                Ok(())
            } else {
                Err(ProbeError::transient(format!("got {code} from {name}")))
            }
        }
        StatusPattern::Regex(expr) => {
            let regex = Regex::new(expr).map_err(|e| {
                ProbeError::permanent(format!("invalid regular expression {expr:?}: {e}"))
            })?;
            if regex.is_match(&code.to_string()) {
                Ok(())
            } else {
                Err(ProbeError::transient(format!(
                    "{code} status code and {expr} regex didn't match in {name}"
                )))
            }
        }
    }
}
