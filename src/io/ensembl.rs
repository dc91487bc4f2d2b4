//! Ensembl REST sequence client.

use std::time::Duration;

use crate::error::FetchError;
use crate::model::{GenomicRange, RetryPolicy, Strand, API_PROBLEM};

pub const TOO_MANY_REQUESTS: u16 = 429;
pub const OK: u16 = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Anything that can answer a plain-text GET.
pub trait HttpGet {
    fn get_text(&self, url: &str) -> Result<HttpReply, FetchError>;
}

pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl HttpGet for UreqClient {
    fn get_text(&self, url: &str) -> Result<HttpReply, FetchError> {
        let transport = |reason: String| FetchError::Transport {
            url: url.to_string(),
            reason,
        };
        match self
            .agent
            .get(url)
            .set("Content-Type", "text/plain")
            .call()
        {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(|e| transport(e.to_string()))?;
                Ok(HttpReply { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => Ok(HttpReply {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(transport(t.to_string())),
        }
    }
}

/// Outcome of one range lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeLookup {
    Sequence(String),
    /// Terminal non-200, non-429 status.
    Failed(u16),
    /// Still 429 after the retry budget was spent.
    Throttled(u32),
}

impl RangeLookup {
    /// Text placed in the output column.
    pub fn render(&self) -> &str {
        match self {
            RangeLookup::Sequence(s) => s,
            RangeLookup::Failed(_) | RangeLookup::Throttled(_) => API_PROBLEM,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, RangeLookup::Sequence(_))
    }
}

pub fn sequence_url(
    endpoint: &str,
    range: &GenomicRange,
    strand: Strand,
    flank5: u32,
    flank3: u32,
) -> String {
    format!(
        "{endpoint}/sequence/region/human/{range}:{}?expand_3prime={flank3}&expand_5prime={flank5}&content-type=text/plain",
        strand.as_param()
    )
}

/// Issue the request, retrying the identical URL while the server throttles.
pub fn lookup(
    client: &dyn HttpGet,
    url: &str,
    retry: &RetryPolicy,
) -> Result<RangeLookup, FetchError> {
    let mut attempt = 0u32;
    loop {
        let reply = client.get_text(url)?;
        match reply.status {
            OK => return Ok(RangeLookup::Sequence(reply.body)),
            TOO_MANY_REQUESTS => {
                if attempt >= retry.max_retries {
                    log::warn!("Still throttled after {attempt} retries: {url}");
                    return Ok(RangeLookup::Throttled(attempt));
                }
                attempt += 1;
                let delay = retry.delay_for(attempt);
                log::info!(
                    "Received status 429. Waiting for {} before sending next request.",
                    humantime::format_duration(delay)
                );
                std::thread::sleep(delay);
            }
            other => {
                log::warn!("No response from ensembl sequence! {other} ({url})");
                return Ok(RangeLookup::Failed(other));
            }
        }
    }
}
