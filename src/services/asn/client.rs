use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{ApiEnvelope, AsnData, AsnRecord, PrefixesData};
use crate::config::{ASN_TIMEOUT_SECONDS, USER_AGENT, registry_url};
use crate::core::{LookupError, LookupResult, QueryContext};
use crate::{log_debug, log_warn};

/// Routing-registry REST client (BGPView API shape)
#[derive(Debug, Clone)]
pub struct AsnClient {
    client: Client,
    base_url: String,
}

impl AsnClient {
    pub fn new() -> LookupResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ASN_TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: registry_url(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch metadata, then prefixes.
    ///
    /// A metadata failure fails the lookup. A prefixes failure is logged and
    /// leaves the record without prefix counts or samples.
    pub async fn lookup(&self, ctx: &QueryContext, asn: u32) -> LookupResult<AsnRecord> {
        let data: AsnData = ctx.run(self.fetch(&format!("/asn/{}", asn))).await?;

        let prefixes = match ctx
            .run(self.fetch::<PrefixesData>(&format!("/asn/{}/prefixes", asn)))
            .await
        {
            Ok(prefixes) => Some(prefixes),
            Err(LookupError::Cancelled) => return Err(LookupError::Cancelled),
            Err(e) => {
                log_warn!("Prefix lookup for AS{} failed, continuing without prefixes: {}", asn, e);
                None
            }
        };

        Ok(AsnRecord::new(data, prefixes))
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> LookupResult<T> {
        let url = format!("{}{}", self.base_url, path);
        log_debug!("Querying routing registry: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(url.clone())
                } else {
                    LookupError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(LookupError::HttpStatus(response.status()));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| LookupError::Decode(format!("{}: {}", url, e)))?;

        if envelope.status != "ok" {
            return Err(LookupError::api_status(
                envelope.status,
                envelope.status_message.unwrap_or_default(),
            ));
        }

        envelope
            .data
            .ok_or_else(|| LookupError::Decode(format!("{}: missing data object", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::{Value, json};

    async fn fake_registry(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn metadata() -> Value {
        json!({
            "status": "ok",
            "status_message": "Query was successful",
            "data": {
                "asn": 64500,
                "name": "EXAMPLE-NET",
                "description_short": "Example Networks",
                "country_code": "US",
                "website": "https://example.net",
                "owner_address": ["1 Example Way", "Springfield"],
                "rir_allocation": {"rir_name": "ARIN", "date_allocated": "2000-03-30 00:00:00"}
            }
        })
    }

    fn prefixes(v4: usize, v6: usize) -> Value {
        let ipv4: Vec<Value> = (0..v4)
            .map(|i| json!({"prefix": format!("198.51.{}.0/24", i), "name": "EXAMPLE"}))
            .collect();
        let ipv6: Vec<Value> = (0..v6)
            .map(|i| json!({"prefix": format!("2001:db8:{:x}::/48", i), "name": "EXAMPLE"}))
            .collect();
        json!({"status": "ok", "data": {"ipv4_prefixes": ipv4, "ipv6_prefixes": ipv6}})
    }

    fn client(base: String) -> AsnClient {
        AsnClient::new().unwrap().with_base_url(base)
    }

    #[tokio::test]
    async fn test_metadata_and_prefixes() {
        let router = Router::new()
            .route("/asn/64500", get(|| async { axum::Json(metadata()) }))
            .route("/asn/64500/prefixes", get(|| async { axum::Json(prefixes(7, 4)) }));
        let base = fake_registry(router).await;

        let record = client(base).lookup(&QueryContext::new(), 64500).await.unwrap();

        assert_eq!(record.asn, 64500);
        assert_eq!(record.name.as_deref(), Some("EXAMPLE-NET"));
        assert_eq!(record.owner_address.len(), 2);
        assert_eq!(record.rir.as_ref().unwrap().rir_name.as_deref(), Some("ARIN"));

        let ipv4 = record.ipv4.unwrap();
        assert_eq!((ipv4.total, ipv4.sample.len()), (7, 5));
        let ipv6 = record.ipv6.unwrap();
        assert_eq!((ipv6.total, ipv6.sample.len()), (4, 3));
    }

    #[tokio::test]
    async fn test_prefixes_failure_is_tolerated() {
        let router = Router::new()
            .route("/asn/64500", get(|| async { axum::Json(metadata()) }))
            .route(
                "/asn/64500/prefixes",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            );
        let base = fake_registry(router).await;

        let record = client(base).lookup(&QueryContext::new(), 64500).await.unwrap();
        assert_eq!(record.description.as_deref(), Some("Example Networks"));
        assert!(record.ipv4.is_none());
        assert!(record.ipv6.is_none());
    }

    #[tokio::test]
    async fn test_metadata_http_failure_is_fatal() {
        let router = Router::new().route("/asn/64500", get(|| async { StatusCode::NOT_FOUND }));
        let base = fake_registry(router).await;

        let result = client(base).lookup(&QueryContext::new(), 64500).await;
        assert!(matches!(result, Err(LookupError::HttpStatus(s)) if s.as_u16() == 404));
    }

    #[tokio::test]
    async fn test_metadata_api_status_is_fatal() {
        let router = Router::new().route(
            "/asn/64500",
            get(|| async {
                axum::Json(json!({"status": "error", "status_message": "Malformed input", "data": null}))
            }),
        );
        let base = fake_registry(router).await;

        let result = client(base).lookup(&QueryContext::new(), 64500).await;
        match result {
            Err(LookupError::ApiStatus { status, message }) => {
                assert_eq!(status, "error");
                assert_eq!(message, "Malformed input");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
