//! TLD to WHOIS server routing, plus per-server query-line quirks

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::IANA_WHOIS_SERVER;

/// Built-in TLD table (lowercase TLD label, authoritative server)
const BUILTIN_SERVERS: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.nic.info"),
    ("biz", "whois.nic.biz"),
    ("name", "whois.nic.name"),
    ("mobi", "whois.nic.mobi"),
    ("pro", "whois.nic.pro"),
    ("aero", "whois.aero"),
    ("asia", "whois.nic.asia"),
    ("cat", "whois.nic.cat"),
    ("coop", "whois.nic.coop"),
    ("edu", "whois.educause.edu"),
    ("gov", "whois.dotgov.gov"),
    ("int", "whois.iana.org"),
    ("jobs", "whois.nic.jobs"),
    ("museum", "whois.nic.museum"),
    ("tel", "whois.nic.tel"),
    ("travel", "whois.nic.travel"),
    // New gTLDs
    ("app", "whois.nic.google"),
    ("dev", "whois.nic.google"),
    ("page", "whois.nic.google"),
    ("blog", "whois.nic.blog"),
    ("cloud", "whois.nic.cloud"),
    ("xyz", "whois.nic.xyz"),
    ("online", "whois.nic.online"),
    ("site", "whois.nic.site"),
    ("tech", "whois.nic.tech"),
    ("store", "whois.nic.store"),
    ("shop", "whois.nic.shop"),
    ("top", "whois.nic.top"),
    ("club", "whois.nic.club"),
    ("network", "whois.nic.network"),
    ("email", "whois.nic.email"),
    // Country-code TLDs
    ("ai", "whois.nic.ai"),
    ("at", "whois.nic.at"),
    ("au", "whois.auda.org.au"),
    ("be", "whois.dns.be"),
    ("br", "whois.registro.br"),
    ("ca", "whois.cira.ca"),
    ("cc", "ccwhois.verisign-grs.com"),
    ("ch", "whois.nic.ch"),
    ("cn", "whois.cnnic.cn"),
    ("co", "whois.nic.co"),
    ("cz", "whois.nic.cz"),
    ("de", "whois.denic.de"),
    ("dk", "whois.dk-hostmaster.dk"),
    ("es", "whois.nic.es"),
    ("eu", "whois.eu"),
    ("fi", "whois.fi"),
    ("fr", "whois.nic.fr"),
    ("gg", "whois.gg"),
    ("hk", "whois.hkirc.hk"),
    ("ie", "whois.weare.ie"),
    ("in", "whois.registry.in"),
    ("io", "whois.nic.io"),
    ("it", "whois.nic.it"),
    ("jp", "whois.jprs.jp"),
    ("kr", "whois.kr"),
    ("li", "whois.nic.li"),
    ("me", "whois.nic.me"),
    ("mx", "whois.mx"),
    ("nl", "whois.domain-registry.nl"),
    ("no", "whois.norid.no"),
    ("nz", "whois.irs.net.nz"),
    ("pl", "whois.dns.pl"),
    ("pt", "whois.dns.pt"),
    ("ru", "whois.tcinet.ru"),
    ("se", "whois.iis.se"),
    ("sg", "whois.sgnic.sg"),
    ("sh", "whois.nic.sh"),
    ("tv", "tvwhois.verisign-grs.com"),
    ("tw", "whois.twnic.net.tw"),
    ("uk", "whois.nic.uk"),
    ("us", "whois.nic.us"),
];

/// Servers whose query syntax differs from a bare `identifier\r\n`
pub(super) const QUERY_PREFIXES: &[(&str, &str)] = &[
    // full record instead of the registrar referral stub
    ("whois.verisign-grs.com", "="),
    ("whois.denic.de", "-T dn,ace "),
];

static BUILTIN: Lazy<Arc<WhoisServerTable>> =
    Lazy::new(|| Arc::new(WhoisServerTable::from_entries(BUILTIN_SERVERS)));

/// Read-only TLD -> server mapping with an IANA fallback
#[derive(Debug, Clone)]
pub struct WhoisServerTable {
    servers: HashMap<String, String>,
}

impl WhoisServerTable {
    pub fn builtin() -> Arc<WhoisServerTable> {
        BUILTIN.clone()
    }

    pub fn from_entries(entries: &[(&str, &str)]) -> Self {
        Self {
            servers: entries
                .iter()
                .map(|(tld, server)| (tld.to_ascii_lowercase(), server.to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Server for a TLD label, if known
    pub fn get(&self, tld: &str) -> Option<&str> {
        self.servers.get(&tld.to_ascii_lowercase()).map(String::as_str)
    }

    /// Server to query for `domain`, falling back to IANA
    pub fn server_for(&self, domain: &str) -> &str {
        get_tld(domain)
            .and_then(|tld| self.get(tld))
            .unwrap_or(IANA_WHOIS_SERVER)
    }
}

/// Final label of a domain
pub fn get_tld(domain: &str) -> Option<&str> {
    domain
        .trim_end_matches('.')
        .rsplit('.')
        .next()
        .filter(|tld| !tld.is_empty())
}

/// CRLF-terminated query line for `server` using the built-in quirk table
pub fn query_line(server: &str, identifier: &str) -> String {
    query_line_with(QUERY_PREFIXES.iter().copied(), server, identifier)
}

/// CRLF-terminated query line; the first `(server, prefix)` entry for `server` applies
pub fn query_line_with<'a>(
    prefixes: impl IntoIterator<Item = (&'a str, &'a str)>,
    server: &str,
    identifier: &str,
) -> String {
    let prefix = prefixes
        .into_iter()
        .find(|(quirk_server, _)| quirk_server.eq_ignore_ascii_case(server))
        .map(|(_, prefix)| prefix)
        .unwrap_or("");
    format!("{}{}\r\n", prefix, identifier)
}
