// netintel - Configuration
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

use clap::Parser;

// WHOIS constants
pub const DEFAULT_WHOIS_PORT: u16 = 43;
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";
pub const WHOIS_DIAL_TIMEOUT_SECONDS: u64 = 10;
pub const WHOIS_EXCHANGE_TIMEOUT_SECONDS: u64 = 15;
pub const WHOIS_MAX_RESPONSE_BYTES: usize = 1024 * 1024; // 1MB

// DNS constants
pub const DNS_TIMEOUT_SECONDS: u64 = 15;
pub const CLOUDFLARE_DOH_URL: &str = "https://cloudflare-dns.com/dns-query";
pub const TXT_DISPLAY_LIMIT: usize = 200;

// Routing registry (BGPView) constants
pub const BGPVIEW_API_URL: &str = "https://api.bgpview.io";
pub const BGPVIEW_WEB_URL: &str = "https://bgpview.io";
pub const ASN_TIMEOUT_SECONDS: u64 = 10;
pub const ASN_IPV4_SAMPLE_CAP: usize = 5;
pub const ASN_IPV6_SAMPLE_CAP: usize = 3;

pub const USER_AGENT: &str = "netintel/0.1";

/// DoH endpoint, overridable with `NETINTEL_DOH_URL`
pub fn doh_url() -> String {
    std::env::var("NETINTEL_DOH_URL").unwrap_or_else(|_| CLOUDFLARE_DOH_URL.to_string())
}

/// Routing registry base URL, overridable with `NETINTEL_REGISTRY_URL`
pub fn registry_url() -> String {
    std::env::var("NETINTEL_REGISTRY_URL").unwrap_or_else(|_| BGPVIEW_API_URL.to_string())
}

#[derive(Parser)]
#[command(author, version, about = "Instant answers for DNS, WHOIS and ASN queries")]
pub struct Cli {
    /// Free-text query, e.g. "dns: example.com/mx", "whois: example.org" or "AS15169"
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Print the answer as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,

    /// Emit logs in journald format
    #[arg(long)]
    pub journald: bool,
}

impl Cli {
    pub fn query_string(&self) -> String {
        self.query.join(" ")
    }
}
