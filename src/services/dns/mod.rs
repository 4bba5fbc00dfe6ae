//! DNS instant answers: `dns: example.com/mx`, `dig example.com`, `nslookup example.com`

mod records;
mod resolver;

pub use records::{CategoryResult, DnsRecordSet, MxRecord, RecordType};
pub use resolver::{DnsResolver, RecordSource};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::config::TXT_DISPLAY_LIMIT;
use crate::core::{
    Answer, AnswerKind, DOMAIN_PATTERN, Handler, QueryContext, RECORD_TYPE_PATTERN, TriggerSet,
};
use crate::log_debug;
use crate::services::utils::{escape_html, truncate_chars};

pub struct DnsHandler {
    triggers: TriggerSet,
    resolver: DnsResolver,
}

impl DnsHandler {
    pub fn new() -> Result<Self> {
        Self::with_resolver(DnsResolver::new()?)
    }

    pub fn with_resolver(resolver: DnsResolver) -> Result<Self> {
        Ok(Self {
            triggers: TriggerSet::new(&trigger_patterns())?,
            resolver,
        })
    }
}

pub fn trigger_patterns() -> Vec<String> {
    let (d, t) = (DOMAIN_PATTERN, RECORD_TYPE_PATTERN);
    vec![
        format!(r"^dns:\s*({d})(?:\s*/\s*({t}))?$"),
        format!(r"^dns\s+lookup\s+({d})(?:\s*/\s*({t}))?$"),
        format!(r"^nslookup\s+({d})(?:\s*/\s*({t}))?$"),
        format!(r"^dig\s+({d})(?:(?:\s*/\s*|\s+)({t}))?$"),
    ]
}

#[async_trait]
impl Handler for DnsHandler {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn matches(&self, query: &str) -> bool {
        self.triggers.matches(query)
    }

    async fn handle(&self, ctx: &QueryContext, query: &str) -> Result<Option<Answer>> {
        let Some(extraction) = self.triggers.extract(query) else {
            return Ok(None);
        };
        let Some(domain) = extraction.identifier.map(|d| d.to_lowercase()) else {
            return Ok(None);
        };

        let qualifier = extraction.qualifier.map(|q| q.to_uppercase());

        let Some(types) = RecordType::selection(qualifier.as_deref()) else {
            return Ok(None);
        };

        log_debug!("DNS lookup for {} ({:?})", domain, qualifier);
        let records = self.resolver.resolve_all(ctx, &domain, &types).await;

        Ok(Some(build_answer(query, &domain, qualifier.as_deref(), &types, &records)))
    }
}

fn title(domain: &str, qualifier: Option<&str>) -> String {
    match qualifier {
        Some(q) if !q.eq_ignore_ascii_case("all") => format!("DNS {} records for {}", q, domain),
        _ => format!("DNS records for {}", domain),
    }
}

pub fn build_answer(
    query: &str,
    domain: &str,
    qualifier: Option<&str>,
    types: &[RecordType],
    records: &DnsRecordSet,
) -> Answer {
    let mut answer = Answer::new(AnswerKind::Dns, query, title(domain, qualifier))
        .with_source("DNS over HTTPS", None);
    answer.field("domain", domain);
    if let Some(q) = qualifier {
        answer.field("type", q);
    }

    if records.is_empty() {
        if types.iter().all(|t| records.unavailable.contains(t)) {
            answer.line(format!("DNS lookup failed for {}.", domain));
        } else {
            answer.line(format!("No DNS records found for {}.", domain));
        }
        return answer;
    }

    for record_type in types {
        let lines: Vec<String> = match record_type {
            RecordType::A => records.a.clone(),
            RecordType::AAAA => records.aaaa.clone(),
            RecordType::CNAME => records.cname.iter().cloned().collect(),
            RecordType::MX => records
                .mx
                .iter()
                .map(|mx| format!("{} {}", mx.priority, mx.host))
                .collect(),
            RecordType::NS => records.ns.clone(),
            RecordType::TXT => records
                .txt
                .iter()
                .map(|txt| format!("\"{}\"", escape_html(&truncate_chars(txt, TXT_DISPLAY_LIMIT))))
                .collect(),
        };

        if lines.is_empty() {
            continue;
        }
        if !answer.display.is_empty() {
            answer.line("");
        }
        answer.line(format!("{} Records:", record_type.as_str()));
        for line in lines {
            answer.line(format!("  {}", line));
        }
    }

    answer
        .field("a", records.a.clone())
        .field("aaaa", records.aaaa.clone())
        .field("cname", records.cname.clone())
        .field("ns", records.ns.clone())
        .field("txt", records.txt.clone());
    if !records.mx.is_empty() {
        answer.field("mx", json!(records.mx));
    }

    answer
}
