// netintel - Handler Contract
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use anyhow::Result;
use async_trait::async_trait;

use super::answer::Answer;
use super::context::QueryContext;

/// Capability set the dispatcher routes queries through.
///
/// `handle` returns `Ok(None)` when the trigger matched but there is nothing to
/// say. Lookup failures are not errors here: they come back as an [`Answer`]
/// whose display carries a short note.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, query: &str) -> bool;

    async fn handle(&self, ctx: &QueryContext, query: &str) -> Result<Option<Answer>>;
}
