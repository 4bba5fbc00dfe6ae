use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::Instant;

use super::servers::{QUERY_PREFIXES, query_line_with};
use crate::config::{
    DEFAULT_WHOIS_PORT, WHOIS_DIAL_TIMEOUT_SECONDS, WHOIS_EXCHANGE_TIMEOUT_SECONDS,
    WHOIS_MAX_RESPONSE_BYTES,
};
use crate::core::{LookupError, LookupResult, QueryContext};
use crate::{log_debug, log_warn};

/// One-shot WHOIS exchange over TCP/43: connect, send one line, read to EOF
#[derive(Debug, Clone)]
pub struct WhoisClient {
    port: u16,
    dial_timeout: Duration,
    exchange_timeout: Duration,
    max_response: usize,
    /// `(server, prefix)` pairs, checked in order
    query_prefixes: Vec<(String, String)>,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_WHOIS_PORT,
            dial_timeout: Duration::from_secs(WHOIS_DIAL_TIMEOUT_SECONDS),
            exchange_timeout: Duration::from_secs(WHOIS_EXCHANGE_TIMEOUT_SECONDS),
            max_response: WHOIS_MAX_RESPONSE_BYTES,
            query_prefixes: QUERY_PREFIXES
                .iter()
                .map(|(server, prefix)| (server.to_string(), prefix.to_string()))
                .collect(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeouts(mut self, dial: Duration, exchange: Duration) -> Self {
        self.dial_timeout = dial;
        self.exchange_timeout = exchange;
        self
    }

    pub fn with_max_response(mut self, bytes: usize) -> Self {
        self.max_response = bytes;
        self
    }

    /// Add a query-line prefix for `server`, taking precedence over built-in quirks
    pub fn with_query_prefix(mut self, server: &str, prefix: &str) -> Self {
        self.query_prefixes.insert(0, (server.to_string(), prefix.to_string()));
        self
    }

    pub fn query_line(&self, server: &str, identifier: &str) -> String {
        query_line_with(
            self.query_prefixes.iter().map(|(s, p)| (s.as_str(), p.as_str())),
            server,
            identifier,
        )
    }

    /// Query `server` for `identifier` and return the raw response text
    pub async fn query(&self, ctx: &QueryContext, server: &str, identifier: &str) -> LookupResult<String> {
        ctx.run(self.exchange(server, identifier)).await
    }

    async fn exchange(&self, server: &str, identifier: &str) -> LookupResult<String> {
        let address = format!("{}:{}", server, self.port);
        log_debug!("Querying WHOIS server: {}", address);

        let mut stream = match tokio::time::timeout(self.dial_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(LookupError::Connect {
                    server: address,
                    source: e,
                });
            }
            Err(_) => {
                return Err(LookupError::Connect {
                    server: address,
                    source: std::io::Error::new(std::io::ErrorKind::TimedOut, "dial timed out"),
                });
            }
        };

        if let Err(e) = stream.set_nodelay(true) {
            log_warn!("Failed to set TCP_NODELAY: {}", e);
        }

        // one deadline covers both the write and the whole read
        let deadline = Instant::now() + self.exchange_timeout;

        let line = self.query_line(server, identifier);
        match tokio::time::timeout_at(deadline, stream.write_all(line.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(LookupError::Write(e)),
            Err(_) => return Err(LookupError::Timeout(format!("writing query to {}", address))),
        }

        let mut reader = BufReader::new(stream);
        let mut response = Vec::new();

        loop {
            let remaining = self.max_response.saturating_sub(response.len());
            if remaining == 0 {
                log_debug!("Response from {} reached {} bytes, truncating", address, self.max_response);
                break;
            }

            // bytes of an unfinished line land in `response` even if the read is cut short
            let mut limited = (&mut reader).take(remaining as u64);
            match tokio::time::timeout_at(deadline, limited.read_until(b'\n', &mut response)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    if response.is_empty() {
                        return Err(LookupError::Read(format!("{}: {}", address, e)));
                    }
                    log_debug!("Read error from {} after {} bytes, keeping partial response: {}", address, response.len(), e);
                    break;
                }
                Err(_) => {
                    if response.is_empty() {
                        return Err(LookupError::Read(format!("{}: deadline passed with no data", address)));
                    }
                    log_debug!("Deadline reached after {} bytes from {}, keeping partial response", response.len(), address);
                    break;
                }
            }
        }
        response.truncate(self.max_response);

        if response.is_empty() {
            return Err(LookupError::EmptyResponse(address));
        }

        log_debug!("Received {} bytes from {}", response.len(), address);
        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}
