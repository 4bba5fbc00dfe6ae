//! DNS-over-HTTPS JSON client
//!
//! Talks to a DoH resolver that speaks the `application/dns-json` dialect
//! (Cloudflare by default) and hands back the raw answer section.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::{DNS_TIMEOUT_SECONDS, USER_AGENT, doh_url};
use crate::core::{LookupError, LookupResult};
use crate::log_debug;
use crate::services::dns::{RecordSource, RecordType};

/// Response codes from RFC 1035 §4.1.1 plus NXDOMAIN
const RCODE_NOERROR: u32 = 0;
const RCODE_NXDOMAIN: u32 = 3;

/// DoH JSON response
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
pub struct DohResponse {
    pub Status: u32,
    #[serde(default)]
    pub Answer: Option<Vec<DohAnswer>>,
}

/// One resource record from the answer section
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[allow(non_snake_case)]
pub struct DohAnswer {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub TTL: u32,
}

impl DohAnswer {
    pub fn new(name: &str, record_type: u16, data: &str) -> Self {
        Self {
            name: name.to_string(),
            record_type,
            data: data.to_string(),
            TTL: 300,
        }
    }
}

/// Client for a JSON DoH endpoint
#[derive(Debug, Clone)]
pub struct DohClient {
    client: Client,
    endpoint: String,
}

impl DohClient {
    pub fn new() -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DNS_TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: doh_url(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn url(&self, name: &str, record_type: RecordType) -> String {
        format!(
            "{}?name={}&type={}&do=false",
            self.endpoint,
            urlencoding::encode(name),
            record_type.as_str()
        )
    }

    /// Query one record type; NXDOMAIN is an empty answer, other rcodes are errors
    pub async fn query(&self, name: &str, record_type: RecordType) -> LookupResult<DohResponse> {
        log_debug!("Querying DoH: {} type={}", name, record_type.as_str());

        let response = self
            .client
            .get(self.url(name, record_type))
            .header("Accept", "application/dns-json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::HttpStatus(response.status()));
        }

        let doh_response: DohResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("DoH body: {}", e)))?;

        match doh_response.Status {
            RCODE_NOERROR | RCODE_NXDOMAIN => Ok(doh_response),
            rcode => Err(LookupError::api_status(
                rcode_name(rcode),
                format!("{} {} lookup", name, record_type.as_str()),
            )),
        }
    }
}

#[async_trait]
impl RecordSource for DohClient {
    async fn lookup(&self, name: &str, record_type: RecordType) -> LookupResult<Vec<DohAnswer>> {
        let response = self.query(name, record_type).await?;
        Ok(response.Answer.unwrap_or_default())
    }
}

fn rcode_name(rcode: u32) -> String {
    match rcode {
        1 => "FORMERR".to_string(),
        2 => "SERVFAIL".to_string(),
        4 => "NOTIMP".to_string(),
        5 => "REFUSED".to_string(),
        other => format!("RCODE{}", other),
    }
}
