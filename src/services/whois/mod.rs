// netintel - Domain WHOIS Service
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

mod client;
mod parser;
mod servers;

pub use client::WhoisClient;
pub use parser::{WhoisRecord, parse_whois};
pub use servers::{WhoisServerTable, get_tld, query_line, query_line_with};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{Answer, AnswerKind, DOMAIN_PATTERN, Handler, QueryContext, TriggerSet};
use crate::{log_debug, log_warn};

/// Answers `whois: example.com` style queries from the registry's own server
pub struct WhoisHandler {
    triggers: TriggerSet,
    servers: Arc<WhoisServerTable>,
    client: WhoisClient,
}

impl WhoisHandler {
    pub fn new() -> Result<Self> {
        Self::with_parts(WhoisServerTable::builtin(), WhoisClient::new())
    }

    pub fn with_parts(servers: Arc<WhoisServerTable>, client: WhoisClient) -> Result<Self> {
        Ok(Self {
            triggers: TriggerSet::new(&trigger_patterns())?,
            servers,
            client,
        })
    }
}

pub fn trigger_patterns() -> Vec<String> {
    let d = DOMAIN_PATTERN;
    vec![
        format!(r"^whois:\s*({d})$"),
        format!(r"^whois\s+lookup\s+({d})$"),
        format!(r"^domain\s+whois\s+({d})$"),
        format!(r"^whois\s+({d})$"),
    ]
}

#[async_trait]
impl Handler for WhoisHandler {
    fn name(&self) -> &'static str {
        "whois"
    }

    fn matches(&self, query: &str) -> bool {
        self.triggers.matches(query)
    }

    async fn handle(&self, ctx: &QueryContext, query: &str) -> Result<Option<Answer>> {
        let Some(domain) = self
            .triggers
            .extract(query)
            .and_then(|e| e.identifier)
            .map(|d| d.to_lowercase())
        else {
            return Ok(None);
        };

        let server = self.servers.server_for(&domain).to_string();
        log_debug!("WHOIS lookup for {} via {}", domain, server);

        let title = format!("WHOIS for {}", domain);
        let raw = match self.client.query(ctx, &server, &domain).await {
            Ok(raw) => raw,
            Err(e) => {
                log_warn!("WHOIS lookup for {} via {} failed: {}", domain, server, e);
                let mut answer = Answer::new(AnswerKind::Whois, query, title)
                    .with_source(format!("WHOIS ({})", server), None);
                answer
                    .line(format!("WHOIS lookup failed: {}", e.user_message()))
                    .field("domain", domain.as_str())
                    .field("server", server.as_str());
                return Ok(Some(answer));
            }
        };

        let record = parse_whois(&raw);
        Ok(Some(build_answer(query, &domain, &server, &record)))
    }
}

pub fn build_answer(query: &str, domain: &str, server: &str, record: &WhoisRecord) -> Answer {
    let mut answer = Answer::new(AnswerKind::Whois, query, format!("WHOIS for {}", domain))
        .with_source(format!("WHOIS ({})", server), None);

    if record.is_empty() {
        answer.line(format!("No WHOIS data could be parsed for {}.", domain));
    } else {
        let scalars = [
            ("Registrar", &record.registrar),
            ("Registrant", &record.registrant_org),
            ("Created", &record.creation_date),
            ("Expires", &record.expiration_date),
            ("Updated", &record.updated_date),
        ];
        for (label, value) in scalars {
            if let Some(value) = value {
                answer.line(format!("{}: {}", label, value));
            }
        }
        if !record.name_servers.is_empty() {
            answer.line(format!("Name Servers: {}", record.name_servers.join(", ")));
        }
        if !record.status.is_empty() {
            answer.line(format!("Status: {}", record.status.join(", ")));
        }
        if let Some(dnssec) = &record.dnssec {
            answer.line(format!("DNSSEC: {}", dnssec));
        }
    }

    answer
        .field("domain", domain)
        .field("registrar", record.registrar.clone())
        .field("registrantOrg", record.registrant_org.clone())
        .field("creationDate", record.creation_date.clone())
        .field("expirationDate", record.expiration_date.clone())
        .field("updatedDate", record.updated_date.clone())
        .field("nameServers", record.name_servers.clone())
        .field("status", record.status.clone())
        .field("dnssec", record.dnssec.clone())
        .field("server", server);

    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn fake_registry(reply: &'static [u8]) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(reply).await.unwrap();
        });
        port
    }

    fn local_handler(port: u16) -> WhoisHandler {
        WhoisHandler::with_parts(
            Arc::new(WhoisServerTable::from_entries(&[("com", "127.0.0.1")])),
            WhoisClient::new()
                .with_port(port)
                .with_timeouts(Duration::from_secs(2), Duration::from_secs(2)),
        )
        .unwrap()
    }

    #[test]
    fn test_trigger_phrasings() {
        let h = local_handler(43);
        for q in [
            "whois: example.com",
            "WHOIS example.com",
            "whois lookup example.com",
            "domain whois example.co.uk",
        ] {
            assert!(h.matches(q), "{}", q);
        }
        for q in ["whois", "whois: localhost", "dns: example.com", "whois example"] {
            assert!(!h.matches(q), "{}", q);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_against_local_server() {
        let port = fake_registry(
            b"Domain Name: EXAMPLE.COM\r\n\
              Registrar: Example Registrar, Inc.\r\n\
              Creation Date: 1995-08-14T04:00:00Z\r\n\
              Name Server: A.IANA-SERVERS.NET\r\n\
              Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited\r\n",
        )
        .await;

        let answer = local_handler(port)
            .handle(&QueryContext::new(), "whois: Example.com")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(answer.kind, AnswerKind::Whois);
        assert_eq!(answer.title, "WHOIS for example.com");
        assert_eq!(answer.source.as_deref(), Some("WHOIS (127.0.0.1)"));
        assert!(answer.display.contains(&"Registrar: Example Registrar, Inc.".to_string()));
        assert!(answer.display.contains(&"Name Servers: a.iana-servers.net".to_string()));
        assert_eq!(
            answer.get_field("status"),
            Some(&serde_json::json!(["clientTransferProhibited"]))
        );
        assert_eq!(answer.get_field("server"), Some(&serde_json::Value::from("127.0.0.1")));
    }

    #[tokio::test]
    async fn test_unparseable_response_gets_note() {
        let port = fake_registry(b"% Rate limit exceeded\r\n").await;
        let answer = local_handler(port)
            .handle(&QueryContext::new(), "whois example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(answer.display, vec!["No WHOIS data could be parsed for example.com."]);
    }

    #[tokio::test]
    async fn test_connect_failure_becomes_error_answer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let answer = local_handler(port)
            .handle(&QueryContext::new(), "whois: example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            answer.display,
            vec!["WHOIS lookup failed: Could not connect to the server."]
        );
    }

    #[tokio::test]
    async fn test_unknown_tld_routes_to_iana() {
        let handler = WhoisHandler::with_parts(
            Arc::new(WhoisServerTable::from_entries(&[("com", "127.0.0.1")])),
            WhoisClient::new(),
        )
        .unwrap();

        // a cancelled context fails before any connection is attempted
        let ctx = QueryContext::new();
        ctx.cancel();
        let answer = handler
            .handle(&ctx, "whois: example.museum")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(answer.get_field("server"), Some(&serde_json::Value::from("whois.iana.org")));
        assert_eq!(answer.source.as_deref(), Some("WHOIS (whois.iana.org)"));
        assert_eq!(answer.display, vec!["WHOIS lookup failed: The lookup was cancelled."]);
    }
}
