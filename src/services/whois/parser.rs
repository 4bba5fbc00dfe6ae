//! Heuristic WHOIS field extraction.
//!
//! Registries agree on almost nothing, so extraction is a single line scan
//! driven by an ordered table of `(field, label synonyms)` rules. A line is
//! claimed by the first rule whose label matches it. Scalar fields keep their
//! first value; list fields collect every distinct value.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Registrar,
    RegistrantOrg,
    CreationDate,
    ExpirationDate,
    UpdatedDate,
    NameServer,
    Status,
    Dnssec,
}

struct Rule {
    field: Field,
    labels: &'static [&'static str],
}

const RULES: &[Rule] = &[
    Rule {
        field: Field::Registrar,
        labels: &["Registrar", "Sponsoring Registrar", "Registrar Name", "registrar-name"],
    },
    Rule {
        field: Field::RegistrantOrg,
        labels: &[
            "Registrant Organization",
            "Registrant Organisation",
            "Registrant Company",
            "Registrant",
            "org-name",
            "org",
        ],
    },
    Rule {
        field: Field::CreationDate,
        labels: &[
            "Creation Date",
            "Created On",
            "Created Date",
            "Created",
            "Registration Date",
            "Registration Time",
            "Domain Registration Date",
            "Registered On",
            "Registered",
            "Fecha de registro",
            "登録年月日",
        ],
    },
    Rule {
        field: Field::ExpirationDate,
        labels: &[
            "Registry Expiry Date",
            "Registrar Registration Expiration Date",
            "Expiration Date",
            "Expiration Time",
            "Expiry Date",
            "Expire Date",
            "Expires On",
            "Expires",
            "paid-till",
            "Valid Until",
            "Fecha de vencimiento",
            "有効期限",
        ],
    },
    Rule {
        field: Field::UpdatedDate,
        labels: &[
            "Updated Date",
            "Last Updated On",
            "Last Updated",
            "Last Modified",
            "Last Update",
            "last-update",
            "Changed",
            "Modified",
            "最終更新",
        ],
    },
    Rule {
        field: Field::NameServer,
        labels: &["Name Server", "Nameserver", "Name Servers", "Nameservers", "nserver", "Host Name"],
    },
    Rule {
        field: Field::Status,
        labels: &["Domain Status", "Status", "state"],
    },
    Rule {
        field: Field::Dnssec,
        labels: &["DNSSEC", "DNSSEC Status", "Signing Key"],
    },
];

struct CompiledRule {
    field: Field,
    pattern: Regex,
}

/// `Label: value` or JPRS-style `[Label]   value`; labels tried longest first
static COMPILED_RULES: Lazy<Vec<CompiledRule>> = Lazy::new(|| {
    RULES
        .iter()
        .filter_map(|rule| {
            let mut labels: Vec<&str> = rule.labels.to_vec();
            labels.sort_by_key(|l| std::cmp::Reverse(l.chars().count()));
            let alternation = labels
                .iter()
                .map(|l| regex::escape(l).replace(' ', r"\s+"))
                .collect::<Vec<_>>()
                .join("|");
            let source = format!(
                r"(?i)^\s*(?:(?:{alt})\s*:|\[(?:{alt})\])\s*(\S.*?)\s*$",
                alt = alternation
            );
            Regex::new(&source)
                .ok()
                .map(|pattern| CompiledRule { field: rule.field, pattern })
        })
        .collect()
});

/// Normalized registration data; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoisRecord {
    pub registrar: Option<String>,
    pub registrant_org: Option<String>,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub name_servers: Vec<String>,
    pub status: Vec<String>,
    pub dnssec: Option<String>,
}

impl WhoisRecord {
    pub fn is_empty(&self) -> bool {
        *self == WhoisRecord::default()
    }
}

/// Parse a raw WHOIS response
pub fn parse_whois(raw: &str) -> WhoisRecord {
    let mut record = WhoisRecord::default();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_comment(trimmed) {
            continue;
        }

        let Some((field, value)) = COMPILED_RULES.iter().find_map(|rule| {
            rule.pattern
                .captures(trimmed)
                .and_then(|caps| caps.get(1))
                .map(|m| (rule.field, m.as_str()))
        }) else {
            continue;
        };

        match field {
            Field::Registrar => set_once(&mut record.registrar, value),
            Field::RegistrantOrg => set_once(&mut record.registrant_org, value),
            Field::CreationDate => set_once(&mut record.creation_date, value),
            Field::ExpirationDate => set_once(&mut record.expiration_date, value),
            Field::UpdatedDate => set_once(&mut record.updated_date, value),
            Field::Dnssec => set_once(&mut record.dnssec, value),
            Field::NameServer => {
                if let Some(ns) = normalize_name_server(value) {
                    push_unique(&mut record.name_servers, ns);
                }
            }
            Field::Status => {
                if let Some(status) = normalize_status(value) {
                    push_unique(&mut record.status, status);
                }
            }
        }
    }

    record
}

/// `%`/`#` comments and the `>>> Last update of WHOIS database <<<` trailer
fn is_comment(line: &str) -> bool {
    line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>")
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Lowercase, drop anything after the host name (glue IPs)
fn normalize_name_server(value: &str) -> Option<String> {
    value
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}

/// Cut at the first embedded "http" (EPP status policy URLs)
fn normalize_status(value: &str) -> Option<String> {
    let cut = match value.find("http") {
        Some(pos) => &value[..pos],
        None => value,
    };
    let status = cut.trim();
    if status.is_empty() {
        None
    } else {
        Some(status.to_string())
    }
}
