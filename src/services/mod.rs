//! Network lookup services: DNS resolution, domain WHOIS and ASN lookups

pub mod asn;
pub mod dns;
pub mod utils;
pub mod whois;

pub use asn::AsnHandler;
pub use dns::DnsHandler;
pub use whois::WhoisHandler;
