use std::net::IpAddr;

use serde::Serialize;

use crate::services::utils::DohAnswer;

/// Record categories the DNS handler can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    TXT,
}

impl RecordType {
    pub const ALL: [RecordType; 6] = [
        RecordType::A,
        RecordType::AAAA,
        RecordType::CNAME,
        RecordType::MX,
        RecordType::NS,
        RecordType::TXT,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::TXT => "TXT",
        }
    }

    /// Wire type code
    pub fn code(&self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::AAAA),
            "CNAME" => Some(RecordType::CNAME),
            "MX" => Some(RecordType::MX),
            "NS" => Some(RecordType::NS),
            "TXT" => Some(RecordType::TXT),
            _ => None,
        }
    }

    /// Categories selected by a qualifier: absent, empty or `ALL` selects everything
    pub fn selection(qualifier: Option<&str>) -> Option<Vec<RecordType>> {
        match qualifier.map(str::trim) {
            None | Some("") => Some(Self::ALL.to_vec()),
            Some(q) if q.eq_ignore_ascii_case("all") => Some(Self::ALL.to_vec()),
            Some(q) => Self::parse(q).map(|t| vec![t]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MxRecord {
    pub host: String,
    pub priority: u16,
}

/// Outcome of one category lookup
#[derive(Debug, Clone)]
pub enum CategoryResult {
    Answers(Vec<DohAnswer>),
    Unavailable,
}

/// Aggregated records for one domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsRecordSet {
    pub a: Vec<String>,
    pub aaaa: Vec<String>,
    pub cname: Option<String>,
    pub mx: Vec<MxRecord>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
    /// Categories whose lookup failed or was abandoned
    pub unavailable: Vec<RecordType>,
}

impl DnsRecordSet {
    /// Merge per-category outcomes; result is independent of completion order
    pub fn merge(domain: &str, outcomes: Vec<(RecordType, CategoryResult)>) -> Self {
        let mut set = DnsRecordSet::default();

        for (record_type, outcome) in outcomes {
            let answers = match outcome {
                CategoryResult::Answers(answers) => answers,
                CategoryResult::Unavailable => {
                    set.unavailable.push(record_type);
                    continue;
                }
            };

            match record_type {
                RecordType::A | RecordType::AAAA => {
                    for answer in &answers {
                        set.add_address(&answer.data);
                    }
                }
                RecordType::CNAME => {
                    if set.cname.is_none() {
                        set.cname = answers
                            .iter()
                            .filter(|a| a.record_type == RecordType::CNAME.code())
                            .map(|a| trim_root(&a.data))
                            .find(|target| !target.is_empty())
                            .filter(|target| !target.eq_ignore_ascii_case(trim_root(domain)))
                            .map(str::to_string);
                    }
                }
                RecordType::MX => {
                    set.mx.extend(
                        answers
                            .iter()
                            .filter(|a| a.record_type == RecordType::MX.code())
                            .filter_map(|a| parse_mx(&a.data)),
                    );
                }
                RecordType::NS => {
                    set.ns.extend(
                        answers
                            .iter()
                            .filter(|a| a.record_type == RecordType::NS.code())
                            .map(|a| trim_root(&a.data).to_string()),
                    );
                }
                RecordType::TXT => {
                    set.txt.extend(
                        answers
                            .iter()
                            .filter(|a| a.record_type == RecordType::TXT.code())
                            .map(|a| unquote_txt(&a.data)),
                    );
                }
            }
        }

        // stable sort keeps arrival order among equal priorities
        set.mx.sort_by_key(|mx| mx.priority);
        set.ns.sort();
        set.txt.sort();
        set
    }

    /// Classify by address family, not by the category that returned it
    fn add_address(&mut self, data: &str) {
        let Ok(ip) = data.trim().parse::<IpAddr>() else {
            return;
        };
        let (bucket, text) = match ip {
            IpAddr::V4(v4) => (&mut self.a, v4.to_string()),
            IpAddr::V6(v6) => (&mut self.aaaa, v6.to_string()),
        };
        if !bucket.contains(&text) {
            bucket.push(text);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
            && self.aaaa.is_empty()
            && self.cname.is_none()
            && self.mx.is_empty()
            && self.ns.is_empty()
            && self.txt.is_empty()
    }
}

fn trim_root(name: &str) -> &str {
    name.trim().trim_end_matches('.')
}

/// `"10 mail.example.com."` -> priority 10, host `mail.example.com`
fn parse_mx(data: &str) -> Option<MxRecord> {
    let mut parts = data.split_whitespace();
    let priority = parts.next()?.parse::<u16>().ok()?;
    let host = trim_root(parts.next()?);
    if host.is_empty() {
        return None;
    }
    Some(MxRecord {
        host: host.to_string(),
        priority,
    })
}

/// Join the quoted character-strings of a TXT record
fn unquote_txt(data: &str) -> String {
    let data = data.trim();
    if !data.starts_with('"') {
        return data.to_string();
    }

    let mut out = String::new();
    let mut in_quotes = false;
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            _ if in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(record_type: RecordType, data: &[&str]) -> CategoryResult {
        CategoryResult::Answers(
            data.iter()
                .map(|d| DohAnswer::new("example.com", record_type.code(), d))
                .collect(),
        )
    }

    #[test]
    fn test_selection() {
        assert_eq!(RecordType::selection(None).unwrap().len(), 6);
        assert_eq!(RecordType::selection(Some("all")).unwrap().len(), 6);
        assert_eq!(RecordType::selection(Some("mx")), Some(vec![RecordType::MX]));
        assert_eq!(RecordType::selection(Some("SOA")), None);
    }

    #[test]
    fn test_mx_sorted_by_priority_stable() {
        let set = DnsRecordSet::merge(
            "example.com",
            vec![(
                RecordType::MX,
                answers(RecordType::MX, &["20 b.example.com.", "10 z.example.com.", "20 a.example.com.", "5 c.example.com."]),
            )],
        );
        let hosts: Vec<_> = set.mx.iter().map(|m| (m.priority, m.host.as_str())).collect();
        assert_eq!(
            hosts,
            vec![(5, "c.example.com"), (10, "z.example.com"), (20, "b.example.com"), (20, "a.example.com")]
        );
    }

    #[test]
    fn test_ns_and_txt_sorted() {
        let set = DnsRecordSet::merge(
            "example.com",
            vec![
                (RecordType::NS, answers(RecordType::NS, &["b.iana-servers.net.", "a.iana-servers.net."])),
                (RecordType::TXT, answers(RecordType::TXT, &["\"v=spf1 -all\"", "\"abc\" \"def\""])),
            ],
        );
        assert_eq!(set.ns, vec!["a.iana-servers.net", "b.iana-servers.net"]);
        assert_eq!(set.txt, vec!["abcdef", "v=spf1 -all"]);
    }

    #[test]
    fn test_addresses_classified_by_family() {
        let set = DnsRecordSet::merge(
            "example.com",
            vec![
                (RecordType::A, answers(RecordType::A, &["93.184.216.34", "2606:2800:220:1::1"])),
                (RecordType::AAAA, answers(RecordType::AAAA, &["2606:2800:220:1::1"])),
            ],
        );
        assert_eq!(set.a, vec!["93.184.216.34"]);
        assert_eq!(set.aaaa, vec!["2606:2800:220:1::1"]);
    }

    #[test]
    fn test_address_category_skips_cname_chain() {
        let set = DnsRecordSet::merge(
            "www.example.com",
            vec![(
                RecordType::A,
                CategoryResult::Answers(vec![
                    DohAnswer::new("www.example.com", 5, "edge.example.net."),
                    DohAnswer::new("edge.example.net", 1, "192.0.2.10"),
                ]),
            )],
        );
        assert_eq!(set.a, vec!["192.0.2.10"]);
    }

    #[test]
    fn test_self_referential_cname_suppressed() {
        let set = DnsRecordSet::merge(
            "example.com",
            vec![(RecordType::CNAME, answers(RecordType::CNAME, &["Example.com."]))],
        );
        assert_eq!(set.cname, None);

        let set = DnsRecordSet::merge(
            "www.example.com",
            vec![(RecordType::CNAME, answers(RecordType::CNAME, &["example.com."]))],
        );
        assert_eq!(set.cname.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_unavailable_categories_recorded() {
        let set = DnsRecordSet::merge(
            "example.com",
            vec![
                (RecordType::NS, CategoryResult::Unavailable),
                (RecordType::A, answers(RecordType::A, &["192.0.2.1"])),
            ],
        );
        assert_eq!(set.unavailable, vec![RecordType::NS]);
        assert_eq!(set.a, vec!["192.0.2.1"]);
        assert!(set.ns.is_empty());
    }

    #[test]
    fn test_unquote_txt_escapes() {
        assert_eq!(unquote_txt(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unquote_txt("bare text"), "bare text");
    }
}
