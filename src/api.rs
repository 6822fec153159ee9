//! Blocking retrieval of the map and dataset resources.
//!
//! A source is either an `http://` / `https://` URL or a local file path.
//! HTTP 5xx responses and transport errors are retried with a short backoff;
//! any other non-success status fails immediately with the status text.
//!
//! ```no_run
//! # use regionmap::Client;
//! let client = Client::default();
//! let bytes = client.fetch_bytes("https://example.org/regions.xlsx")?;
//! # Ok::<(), regionmap::Error>(())
//! ```

use crate::error::{Error, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::time::Duration;

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(t.to_string())
        } else if let Some(path) = t.strip_prefix("file://") {
            Source::File(PathBuf::from(path))
        } else {
            Source::File(PathBuf::from(t))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(u) => f.write_str(u),
            Source::File(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    backoff_ms: Vec<u64>,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("regionmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            http,
            backoff_ms: vec![100, 300, 700],
        }
    }
}

impl Client {
    /// Client that gives up after the first failed attempt.
    pub fn without_retries() -> Self {
        Self {
            backoff_ms: vec![0],
            ..Self::default()
        }
    }

    /// Fetch the raw bytes of a URL or file.
    pub fn fetch_bytes(&self, source: &str) -> Result<Vec<u8>> {
        match Source::parse(source) {
            Source::Url(url) => self.get(&url),
            Source::File(path) => std::fs::read(&path).map_err(|e| Error::Fetch {
                url: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Fetch a resource and decode it as UTF-8 text.
    pub fn fetch_text(&self, source: &str) -> Result<String> {
        let bytes = self.fetch_bytes(source)?;
        String::from_utf8(bytes).map_err(|e| Error::Parse(format!("{source} is not UTF-8: {e}")))
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_err = String::from("no attempt made");
        for (attempt, backoff_ms) in self.backoff_ms.iter().enumerate() {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    let body = r.bytes().map_err(|e| Error::Fetch {
                        url: url.to_string(),
                        reason: format!("reading body: {e}"),
                    })?;
                    log::debug!("GET {url}: {} byte(s)", body.len());
                    return Ok(body.to_vec());
                }
                Ok(r) if r.status().is_server_error() => last_err = r.status().to_string(),
                Ok(r) => {
                    return Err(Error::Fetch {
                        url: url.to_string(),
                        reason: r.status().to_string(),
                    });
                }
                Err(e) => last_err = e.to_string(),
            }
            log::debug!("GET {url} attempt {} failed: {last_err}", attempt + 1);
            if attempt + 1 < self.backoff_ms.len() {
                std::thread::sleep(Duration::from_millis(*backoff_ms));
            }
        }
        Err(Error::Fetch {
            url: url.to_string(),
            reason: last_err,
        })
    }
}
