//! The four transport tiers, in fallback order.
//!
//! Tier 1 and 2 are reqwest clients tuned for compatibility over
//! strictness. Tier 3 issues a raw HTTP/1.0 request over its own
//! socket with manual redirect following. Tier 4 shells out to curl,
//! bypassing the process's network stack entirely. Every tier bounds
//! its own runtime with a timeout and converts all failures into
//! [`TransportError`] for the orchestrator to log and fall through.

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{TransportError, TransportResult};
use crate::traits::FetchTier;

/// Status codes 200..500 are retrievable: even error pages from the
/// knowledge sources carry usable markup, and 4xx bodies frequently
/// hold the content behind a soft paywall or geo notice.
fn status_retrievable(status: u16) -> bool {
    (200..500).contains(&status)
}

fn reqwest_error(url: &Url, timeout: Duration, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        TransportError::Http(Box::new(e))
    }
}

/// Tier 1: standard HTTP client configured for maximum compatibility.
///
/// Permissive certificate validation, wide TLS version range, generic
/// user agent, 45 second timeout.
pub struct PrimaryHttpTier {
    client: reqwest::Client,
    timeout: Duration,
}

impl PrimaryHttpTier {
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_0)
            .timeout(config.primary_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            timeout: config.primary_timeout,
        }
    }
}

#[async_trait]
impl FetchTier for PrimaryHttpTier {
    fn name(&self) -> &'static str {
        "primary_http"
    }

    // The plain client is cheap enough to keep in offline mode
    fn offline_capable(&self) -> bool {
        true
    }

    async fn attempt(&self, url: &Url) -> TransportResult<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| reqwest_error(url, self.timeout, e))?;

        let status = response.status().as_u16();
        if !status_retrievable(status) {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| reqwest_error(url, self.timeout, e))?;
        debug!(url = %url, status = status, bytes = body.len(), "Primary tier fetched");
        Ok(body)
    }
}

/// Tier 2: a second client with an even more permissive negotiation
/// profile and a legacy-style user agent, for sources that reject
/// modern clients. Longer timeout (120s) for slow origins.
pub struct PermissiveHttpTier {
    client: reqwest::Client,
    timeout: Duration,
}

impl PermissiveHttpTier {
    pub fn new(config: &FetchConfig) -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .min_tls_version(reqwest::tls::Version::TLS_1_0)
            .http1_only()
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(config.secondary_timeout)
            .user_agent(config.legacy_user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            timeout: config.secondary_timeout,
        }
    }
}

#[async_trait]
impl FetchTier for PermissiveHttpTier {
    fn name(&self) -> &'static str {
        "permissive_http"
    }

    async fn attempt(&self, url: &Url) -> TransportResult<String> {
        let response = self
            .client
            .get(url.as_str())
            .header("Accept", "*/*")
            .send()
            .await
            .map_err(|e| reqwest_error(url, self.timeout, e))?;

        let status = response.status().as_u16();
        if !status_retrievable(status) {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| reqwest_error(url, self.timeout, e))?;
        debug!(url = %url, status = status, bytes = body.len(), "Permissive tier fetched");
        Ok(body)
    }
}

/// Parsed outcome of one raw request.
enum RawResponse {
    Body(String),
    Redirect(String),
}

/// Tier 3: raw HTTP/1.0 request over our own socket, with its own TLS
/// negotiation settings and manual redirect following. HTTP/1.0 keeps
/// responses unchunked so the body can be read straight off the wire.
pub struct RawSocketTier {
    timeout: Duration,
    user_agent: String,
    max_redirects: usize,
}

impl RawSocketTier {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            timeout: config.raw_timeout,
            user_agent: config.legacy_user_agent.clone(),
            max_redirects: 5,
        }
    }

    async fn request_once(&self, url: &Url) -> TransportResult<RawResponse> {
        let host = url.host_str().ok_or_else(|| TransportError::InvalidUrl {
            url: url.to_string(),
        })?;
        let port = url.port_or_known_default().unwrap_or(80);

        let mut target = url.path().to_string();
        if let Some(query) = url.query() {
            target.push('?');
            target.push_str(query);
        }
        if target.is_empty() {
            target.push('/');
        }

        let request = format!(
            "GET {target} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: {ua}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
            ua = self.user_agent,
        );

        let stream = TcpStream::connect((host, port)).await?;

        let raw = if url.scheme() == "https" {
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| TransportError::Tls(Box::new(e)))?;
            let connector = tokio_native_tls::TlsConnector::from(connector);
            let mut tls = connector
                .connect(host, stream)
                .await
                .map_err(|e| TransportError::Tls(Box::new(e)))?;
            exchange(&mut tls, &request).await?
        } else {
            let mut stream = stream;
            exchange(&mut stream, &request).await?
        };

        parse_raw_response(&raw, url)
    }
}

#[async_trait]
impl FetchTier for RawSocketTier {
    fn name(&self) -> &'static str {
        "raw_socket"
    }

    async fn attempt(&self, url: &Url) -> TransportResult<String> {
        let mut current = url.clone();

        for _ in 0..=self.max_redirects {
            let response = tokio::time::timeout(self.timeout, self.request_once(&current))
                .await
                .map_err(|_| TransportError::Timeout {
                    url: current.to_string(),
                    seconds: self.timeout.as_secs(),
                })??;

            match response {
                RawResponse::Body(body) => {
                    debug!(url = %current, bytes = body.len(), "Raw tier fetched");
                    return Ok(body);
                }
                RawResponse::Redirect(location) => {
                    debug!(url = %current, location = %location, "Raw tier following redirect");
                    current = current
                        .join(&location)
                        .map_err(|_| TransportError::InvalidUrl { url: location })?;
                }
            }
        }

        Err(TransportError::TooManyRedirects {
            url: url.to_string(),
        })
    }
}

/// Write the request and drain the response. A read error after some
/// bytes arrived is tolerated: servers that skip TLS close_notify are
/// exactly the kind of host this tier exists for.
async fn exchange<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    request: &str,
) -> TransportResult<Vec<u8>> {
    stream.write_all(request.as_bytes()).await?;

    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
            Err(e) if raw.is_empty() => return Err(e.into()),
            Err(_) => break,
        }
    }
    Ok(raw)
}

fn parse_raw_response(raw: &[u8], url: &Url) -> TransportResult<RawResponse> {
    let text = String::from_utf8_lossy(raw);
    let (head, body) = text
        .split_once("\r\n\r\n")
        .or_else(|| text.split_once("\n\n"))
        .ok_or_else(|| TransportError::EmptyBody {
            url: url.to_string(),
        })?;

    let status_line = head.lines().next().unwrap_or_default();
    let status: u16 = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TransportError::Http(
            format!("malformed status line: {status_line}").into(),
        ))?;

    if matches!(status, 301 | 302 | 303 | 307 | 308) {
        let location = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("location")
                    .then(|| value.trim().to_string())
            })
            .ok_or(TransportError::Status {
                status,
                url: url.to_string(),
            })?;
        return Ok(RawResponse::Redirect(location));
    }

    if !status_retrievable(status) {
        return Err(TransportError::Status {
            status,
            url: url.to_string(),
        });
    }

    Ok(RawResponse::Body(body.to_string()))
}

/// Tier 4: delegate to the curl binary as a subprocess, bypassing the
/// process's own network stack. Insecure-certificate flags mirror the
/// permissive posture of the earlier tiers.
pub struct CurlSubprocessTier {
    timeout: Duration,
    user_agent: String,
}

impl CurlSubprocessTier {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            timeout: config.subprocess_timeout,
            user_agent: config.legacy_user_agent.clone(),
        }
    }
}

#[async_trait]
impl FetchTier for CurlSubprocessTier {
    fn name(&self) -> &'static str {
        "curl_subprocess"
    }

    async fn attempt(&self, url: &Url) -> TransportResult<String> {
        let max_time = self.timeout.as_secs().max(1);

        let command = tokio::process::Command::new("curl")
            .arg("-sS")
            .arg("-L")
            .arg("-k")
            .arg("--max-time")
            .arg(max_time.to_string())
            .arg("-A")
            .arg(&self.user_agent)
            .arg(url.as_str())
            .kill_on_drop(true)
            .output();

        // Grace period on top of curl's own --max-time
        let output = tokio::time::timeout(self.timeout + Duration::from_secs(5), command)
            .await
            .map_err(|_| TransportError::Timeout {
                url: url.to_string(),
                seconds: max_time,
            })?
            .map_err(|e| TransportError::Subprocess {
                reason: format!("failed to spawn curl: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Subprocess {
                reason: stderr.trim().chars().take(200).collect(),
            });
        }

        let body = String::from_utf8_lossy(&output.stdout).into_owned();
        if body.trim().is_empty() {
            return Err(TransportError::EmptyBody {
                url: url.to_string(),
            });
        }

        debug!(url = %url, bytes = body.len(), "Subprocess tier fetched");
        Ok(body)
    }
}

/// The standard four-tier table, in fallback order.
pub fn default_tiers(config: &FetchConfig) -> Vec<Box<dyn FetchTier>> {
    vec![
        Box::new(PrimaryHttpTier::new(config)),
        Box::new(PermissiveHttpTier::new(config)),
        Box::new(RawSocketTier::new(config)),
        Box::new(CurlSubprocessTier::new(config)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_retrievable_range() {
        assert!(status_retrievable(200));
        assert!(status_retrievable(404));
        assert!(status_retrievable(499));
        assert!(!status_retrievable(500));
        assert!(!status_retrievable(199));
    }

    #[test]
    fn test_parse_raw_body() {
        let url = Url::parse("https://example.com/page").unwrap();
        let raw = b"HTTP/1.0 200 OK\r\nContent-Type: text/html\r\n\r\n<html>ok</html>";

        match parse_raw_response(raw, &url).unwrap() {
            RawResponse::Body(body) => assert_eq!(body, "<html>ok</html>"),
            RawResponse::Redirect(_) => panic!("expected body"),
        }
    }

    #[test]
    fn test_parse_raw_redirect() {
        let url = Url::parse("https://example.com/old").unwrap();
        let raw = b"HTTP/1.0 301 Moved\r\nLocation: /new\r\n\r\n";

        match parse_raw_response(raw, &url).unwrap() {
            RawResponse::Redirect(location) => assert_eq!(location, "/new"),
            RawResponse::Body(_) => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_parse_raw_server_error() {
        let url = Url::parse("https://example.com/broken").unwrap();
        let raw = b"HTTP/1.0 503 Unavailable\r\n\r\ndown";

        assert!(matches!(
            parse_raw_response(raw, &url),
            Err(TransportError::Status { status: 503, .. })
        ));
    }

    #[test]
    fn test_default_tier_order() {
        let tiers = default_tiers(&FetchConfig::new());
        let names: Vec<_> = tiers.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec!["primary_http", "permissive_http", "raw_socket", "curl_subprocess"]
        );
        // Only the primary tier survives offline mode
        assert!(tiers[0].offline_capable());
        assert!(tiers[1..].iter().all(|t| !t.offline_capable()));
    }
}
