use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::time::Instant;

use super::records::{CategoryResult, DnsRecordSet, RecordType};
use crate::config::DNS_TIMEOUT_SECONDS;
use crate::core::{LookupError, LookupResult, QueryContext};
use crate::log_debug;
use crate::services::utils::{DohAnswer, DohClient};

/// A resolver able to answer one record type for one name
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn lookup(&self, name: &str, record_type: RecordType) -> LookupResult<Vec<DohAnswer>>;
}

/// Fans out one lookup per category and merges them into a [`DnsRecordSet`]
#[derive(Clone)]
pub struct DnsResolver {
    source: Arc<dyn RecordSource>,
    timeout: Duration,
}

impl DnsResolver {
    /// Resolver backed by the configured DoH endpoint
    pub fn new() -> LookupResult<Self> {
        Ok(Self::with_source(Arc::new(DohClient::new()?)))
    }

    pub fn with_source(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(DNS_TIMEOUT_SECONDS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the requested categories concurrently.
    ///
    /// Never fails: a category whose lookup errors, times out or is cancelled
    /// is marked unavailable and contributes no records. All categories share
    /// one deadline, so categories that finished before it are kept.
    pub async fn resolve_all(
        &self,
        ctx: &QueryContext,
        domain: &str,
        types: &[RecordType],
    ) -> DnsRecordSet {
        let deadline = Instant::now() + self.timeout;
        let source = &self.source;

        let lookups = types.iter().copied().map(move |record_type| async move {
            let result = ctx
                .run(async {
                    match tokio::time::timeout_at(deadline, source.lookup(domain, record_type)).await {
                        Ok(result) => result,
                        Err(_) => Err(LookupError::Timeout(format!("{} lookup", record_type.as_str()))),
                    }
                })
                .await;

            match result {
                Ok(answers) => (record_type, CategoryResult::Answers(answers)),
                Err(e) => {
                    log_debug!("{} lookup for {} unavailable: {}", record_type.as_str(), domain, e);
                    (record_type, CategoryResult::Unavailable)
                }
            }
        });

        let outcomes = join_all(lookups).await;
        DnsRecordSet::merge(domain, outcomes)
    }
}
