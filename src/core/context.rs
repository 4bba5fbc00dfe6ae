// netintel - Query Context
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-query cancellation scope shared by every external call of a lookup.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::error::{LookupError, LookupResult};

#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    cancel: CancellationToken,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every lookup running under this context or a clone of it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Race `fut` against cancellation of this context
    pub async fn run<F, T>(&self, fut: F) -> LookupResult<T>
    where
        F: Future<Output = LookupResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(LookupError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let ctx = QueryContext::new();
        let value = ctx.run(async { Ok::<_, LookupError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancel_from_clone_aborts_run() {
        let ctx = QueryContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, LookupError>(())
            })
            .await;
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_future() {
        let ctx = QueryContext::new();
        ctx.cancel();
        let result = ctx.run(async { Ok::<_, LookupError>(1) }).await;
        assert!(matches!(result, Err(LookupError::Cancelled)));
    }
}
