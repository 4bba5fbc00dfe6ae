//! # netintel
//!
//! Free-text instant answers for network infrastructure questions.
//!
//! A query is matched against each handler's trigger patterns in order; the
//! first handler that recognizes it performs the lookup and returns an
//! [`Answer`] with display lines and a machine-readable field map.
//!
//! ## Supported Queries
//!
//! ### DNS (over HTTPS)
//! - `dns: example.com`, `dns: example.com/MX`
//! - `dns lookup example.com`, `nslookup example.com`, `dig example.com txt`
//!
//! ### WHOIS (TCP/43)
//! - `whois: example.com`, `whois example.com`, `domain whois example.com`
//!
//! ### ASN (routing registry)
//! - `AS15169`, `asn: 15169`, `asn: AS15169`, `asn lookup 15169`
//!
//! ## Usage
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     if let Some(answer) = netintel::query("dns: example.com/mx").await?.answer() {
//!         println!("{}", answer);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod services;

// Re-export commonly used types for convenience
pub use core::{Answer, AnswerKind, DispatchOutcome, Dispatcher, Handler, LookupError, QueryContext};

/// Answer a free-text query with the default DNS, WHOIS and ASN handlers
pub async fn query(input: &str) -> anyhow::Result<DispatchOutcome> {
    query_with_context(&QueryContext::new(), input).await
}

/// Same as [`query`], but lookups abort when `ctx` is cancelled
pub async fn query_with_context(ctx: &QueryContext, input: &str) -> anyhow::Result<DispatchOutcome> {
    let dispatcher = Dispatcher::with_default_handlers()?;
    Ok(dispatcher.dispatch(ctx, input).await)
}
