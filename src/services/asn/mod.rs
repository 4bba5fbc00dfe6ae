// netintel - ASN Lookup Service
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Autonomous system lookups against the routing registry.
//!
//! Accepts `asn: 15169`, `asn: AS15169`, `AS15169` and `asn lookup 15169`.

mod client;
mod types;

pub use client::AsnClient;
pub use types::{AsnData, AsnRecord, Prefix, PrefixSample, PrefixesData, RirAllocation};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::config::BGPVIEW_WEB_URL;
use crate::core::{Answer, AnswerKind, Handler, LookupError, QueryContext, TriggerSet};
use crate::{log_debug, log_warn};

pub struct AsnHandler {
    triggers: TriggerSet,
    client: AsnClient,
}

impl AsnHandler {
    pub fn new() -> Result<Self> {
        Self::with_client(AsnClient::new()?)
    }

    pub fn with_client(client: AsnClient) -> Result<Self> {
        Ok(Self {
            triggers: TriggerSet::new(&trigger_patterns())?,
            client,
        })
    }
}

pub fn trigger_patterns() -> Vec<String> {
    vec![
        r"^asn:\s*(?:as)?(\d+)$".to_string(),
        r"^as(\d+)$".to_string(),
        r"^asn\s+lookup\s+(?:as)?(\d+)$".to_string(),
    ]
}

/// Parse an extracted identifier into an AS number
pub fn parse_asn(identifier: &str) -> Result<u32, LookupError> {
    identifier
        .parse::<u32>()
        .map_err(|_| LookupError::InvalidIdentifier(identifier.to_string()))
}

#[async_trait]
impl Handler for AsnHandler {
    fn name(&self) -> &'static str {
        "asn"
    }

    fn matches(&self, query: &str) -> bool {
        self.triggers.matches(query)
    }

    async fn handle(&self, ctx: &QueryContext, query: &str) -> Result<Option<Answer>> {
        let Some(identifier) = self.triggers.extract(query).and_then(|e| e.identifier) else {
            return Ok(None);
        };

        // digits beyond u32 are not an AS number
        let asn = match parse_asn(&identifier) {
            Ok(asn) => asn,
            Err(e) => {
                log_debug!("Ignoring ASN query {:?}: {}", query, e);
                return Ok(None);
            }
        };

        let source_url = format!("{}/asn/{}", BGPVIEW_WEB_URL, asn);
        match self.client.lookup(ctx, asn).await {
            Ok(record) => Ok(Some(build_answer(query, &record).with_source("BGPView", Some(source_url)))),
            Err(e) => {
                log_warn!("ASN lookup for AS{} failed: {}", asn, e);
                let mut answer = Answer::new(AnswerKind::Asn, query, format!("AS{}", asn))
                    .with_source("BGPView", Some(source_url));
                answer
                    .line(format!("ASN lookup failed: {}", e.user_message()))
                    .field("asn", asn);
                Ok(Some(answer))
            }
        }
    }
}

fn prefix_lines(answer: &mut Answer, label: &str, sample: &PrefixSample) {
    answer.line(format!("{} Prefixes: {}", label, sample.total));
    for prefix in &sample.sample {
        match &prefix.name {
            Some(name) if !name.is_empty() => answer.line(format!("  {} ({})", prefix.prefix, name)),
            _ => answer.line(format!("  {}", prefix.prefix)),
        };
    }
    if sample.remaining() > 0 {
        answer.line(format!("  … and {} more", sample.remaining()));
    }
}

pub fn build_answer(query: &str, record: &AsnRecord) -> Answer {
    let title = match &record.name {
        Some(name) => format!("AS{} {}", record.asn, name),
        None => format!("AS{}", record.asn),
    };
    let mut answer = Answer::new(AnswerKind::Asn, query, title);

    if let Some(description) = &record.description {
        answer.line(format!("Description: {}", description));
    }
    if let Some(country) = &record.country_code {
        answer.line(format!("Country: {}", country));
    }
    if let Some(website) = &record.website {
        answer.line(format!("Website: {}", website));
    }
    if let Some(rir) = &record.rir {
        match (&rir.rir_name, &rir.date_allocated) {
            (Some(name), Some(date)) => answer.line(format!("RIR: {} (allocated {})", name, date)),
            (Some(name), None) => answer.line(format!("RIR: {}", name)),
            (None, Some(date)) => answer.line(format!("Allocated: {}", date)),
            (None, None) => &mut answer,
        };
    }
    if !record.owner_address.is_empty() {
        answer.line("Owner Address:");
        for line in &record.owner_address {
            answer.line(format!("  {}", line));
        }
    }
    if let Some(ipv4) = &record.ipv4 {
        prefix_lines(&mut answer, "IPv4", ipv4);
    }
    if let Some(ipv6) = &record.ipv6 {
        prefix_lines(&mut answer, "IPv6", ipv6);
    }

    answer
        .field("asn", record.asn)
        .field("name", record.name.clone())
        .field("description", record.description.clone())
        .field("countryCode", record.country_code.clone())
        .field("website", record.website.clone())
        .field("ownerAddressLines", record.owner_address.clone());
    if let Some(rir) = &record.rir {
        answer.field("rir", json!(rir));
    }
    if let Some(ipv4) = &record.ipv4 {
        answer
            .field("ipv4PrefixCount", ipv4.total)
            .field("sampleIPv4Prefixes", json!(ipv4.sample));
    }
    if let Some(ipv6) = &record.ipv6 {
        answer
            .field("ipv6PrefixCount", ipv6.total)
            .field("sampleIPv6Prefixes", json!(ipv6.sample));
    }

    answer
}
