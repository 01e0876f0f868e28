use crate::Result;
use reqwest::StatusCode;
use sonar_runner_types::ServerUrl;
use std::time::Duration;

/// Endpoint requested to check that the analysis server answers
pub const VERSION_PATH: &str = "api/server/version";

/// Answers a proxy or gateway gives when it could not reach the server itself
const GATEWAY_STATUSES: &[StatusCode] = &[StatusCode::BAD_GATEWAY, StatusCode::GATEWAY_TIMEOUT];

/// Answers whether the analysis server can be reached.
pub trait ServerProbe {
    fn is_reachable(&self, url: &ServerUrl) -> bool;
}

/// Probe over HTTP.
///
/// Any response counts as reachable except the gateway errors a proxy sends
/// on behalf of a server it could not reach.
pub struct HttpProbe {
    client: reqwest::blocking::Client,
    direct: reqwest::blocking::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(10))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let connect_timeout = timeout.min(Duration::from_secs(5));
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        // Loopback servers are never reached through a proxy.
        let direct = reqwest::blocking::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .no_proxy()
            .build()?;
        Ok(Self { client, direct })
    }
}

impl ServerProbe for HttpProbe {
    fn is_reachable(&self, url: &ServerUrl) -> bool {
        let client = if url.is_loopback() {
            &self.direct
        } else {
            &self.client
        };
        match client.get(url.join(VERSION_PATH)).send() {
            Ok(response) => !GATEWAY_STATUSES.contains(&response.status()),
            Err(_) => false,
        }
    }
}
