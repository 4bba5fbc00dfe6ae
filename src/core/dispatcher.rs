// netintel - Query Dispatcher
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Linear first-match routing over an ordered handler list

use std::sync::Arc;

use super::answer::Answer;
use super::context::QueryContext;
use super::handler::Handler;
use crate::services::{AsnHandler, DnsHandler, WhoisHandler};
use crate::{log_debug, log_info, log_warn};

#[derive(Debug)]
pub enum DispatchOutcome {
    Answered(Answer),
    /// A handler claimed the query but had nothing to say
    Absent,
    /// No handler recognized the query
    Unhandled,
}

impl DispatchOutcome {
    pub fn answer(self) -> Option<Answer> {
        match self {
            DispatchOutcome::Answered(answer) => Some(answer),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    handlers: Vec<Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(handlers: Vec<Arc<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// DNS, WHOIS and ASN handlers with default configuration
    pub fn with_default_handlers() -> anyhow::Result<Self> {
        Ok(Self::new(vec![
            Arc::new(DnsHandler::new()?),
            Arc::new(WhoisHandler::new()?),
            Arc::new(AsnHandler::new()?),
        ]))
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub async fn dispatch(&self, ctx: &QueryContext, query: &str) -> DispatchOutcome {
        let query = query.trim();

        let Some(handler) = self.handlers.iter().find(|h| h.matches(query)) else {
            log_debug!("No handler for query: {}", query);
            return DispatchOutcome::Unhandled;
        };

        log_info!("Routing query '{}' to {} handler", query, handler.name());

        match handler.handle(ctx, query).await {
            Ok(Some(answer)) => DispatchOutcome::Answered(answer),
            Ok(None) => DispatchOutcome::Absent,
            Err(e) => {
                log_warn!("{} handler failed for '{}': {:#}", handler.name(), query, e);
                DispatchOutcome::Absent
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::answer::AnswerKind;
    use async_trait::async_trait;

    struct Prefix {
        name: &'static str,
        prefix: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Handler for Prefix {
        fn name(&self) -> &'static str {
            self.name
        }

        fn matches(&self, query: &str) -> bool {
            query.starts_with(self.prefix)
        }

        async fn handle(&self, _ctx: &QueryContext, query: &str) -> anyhow::Result<Option<Answer>> {
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(Some(Answer::new(AnswerKind::Dns, query, self.name)))
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(vec![
            Arc::new(Prefix { name: "first", prefix: "x", fail: false }),
            Arc::new(Prefix { name: "second", prefix: "x", fail: false }),
            Arc::new(Prefix { name: "broken", prefix: "y", fail: true }),
        ])
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let outcome = dispatcher().dispatch(&QueryContext::new(), "  xyz ").await;
        let answer = outcome.answer().unwrap();
        assert_eq!(answer.title, "first");
        assert_eq!(answer.query, "xyz");
    }

    #[tokio::test]
    async fn test_unhandled_and_failing_handlers() {
        let d = dispatcher();
        assert!(matches!(d.dispatch(&QueryContext::new(), "zzz").await, DispatchOutcome::Unhandled));
        assert!(matches!(d.dispatch(&QueryContext::new(), "yyy").await, DispatchOutcome::Absent));
        // a failure must not poison later queries
        assert!(d.dispatch(&QueryContext::new(), "xxx").await.answer().is_some());
    }

    #[test]
    fn test_default_handler_order() {
        let d = Dispatcher::with_default_handlers().unwrap();
        assert_eq!(d.handler_names(), vec!["dns", "whois", "asn"]);
    }
}
