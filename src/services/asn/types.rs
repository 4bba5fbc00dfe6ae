use serde::{Deserialize, Serialize};

use crate::config::{ASN_IPV4_SAMPLE_CAP, ASN_IPV6_SAMPLE_CAP};

/// BGPView response envelope: `{"status": "ok", "status_message": "...", "data": {...}}`
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub status: String,
    #[serde(default)]
    pub status_message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AsnData {
    pub asn: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description_short: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub owner_address: Option<Vec<String>>,
    #[serde(default)]
    pub rir_allocation: Option<RirAllocation>,
}

/// Read as BGPView's `{rir_name, date_allocated}`, written as `{name, dateAllocated}`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RirAllocation {
    #[serde(rename(serialize = "name"))]
    pub rir_name: Option<String>,
    #[serde(rename(serialize = "dateAllocated"))]
    pub date_allocated: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrefixesData {
    #[serde(default)]
    pub ipv4_prefixes: Vec<Prefix>,
    #[serde(default)]
    pub ipv6_prefixes: Vec<Prefix>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Prefix {
    pub prefix: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Capped sample of an announced prefix list
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PrefixSample {
    pub total: usize,
    pub sample: Vec<Prefix>,
}

impl PrefixSample {
    pub fn from_list(prefixes: &[Prefix], cap: usize) -> Self {
        Self {
            total: prefixes.len(),
            sample: prefixes.iter().take(cap).cloned().collect(),
        }
    }

    /// How many prefixes were left out of the sample
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.sample.len())
    }
}

/// Normalized autonomous system record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsnRecord {
    pub asn: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    pub country_code: Option<String>,
    pub website: Option<String>,
    pub owner_address: Vec<String>,
    pub rir: Option<RirAllocation>,
    /// `None` when the prefixes call failed
    pub ipv4: Option<PrefixSample>,
    pub ipv6: Option<PrefixSample>,
}

impl AsnRecord {
    pub fn new(data: AsnData, prefixes: Option<PrefixesData>) -> Self {
        let (ipv4, ipv6) = match prefixes {
            Some(p) => (
                Some(PrefixSample::from_list(&p.ipv4_prefixes, ASN_IPV4_SAMPLE_CAP)),
                Some(PrefixSample::from_list(&p.ipv6_prefixes, ASN_IPV6_SAMPLE_CAP)),
            ),
            None => (None, None),
        };

        Self {
            asn: data.asn,
            name: non_empty(data.name),
            description: non_empty(data.description_short),
            country_code: non_empty(data.country_code),
            website: non_empty(data.website),
            owner_address: data
                .owner_address
                .unwrap_or_default()
                .into_iter()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty())
                .collect(),
            rir: data
                .rir_allocation
                .filter(|r| r.rir_name.is_some() || r.date_allocated.is_some()),
            ipv4,
            ipv6,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes(n: usize, v6: bool) -> Vec<Prefix> {
        (0..n)
            .map(|i| Prefix {
                prefix: if v6 {
                    format!("2001:db8:{:x}::/48", i)
                } else {
                    format!("198.51.{}.0/24", i)
                },
                name: None,
            })
            .collect()
    }

    #[test]
    fn test_sample_caps() {
        let data: AsnData = serde_json::from_str(r#"{"asn": 64500}"#).unwrap();
        let record = AsnRecord::new(
            data,
            Some(PrefixesData {
                ipv4_prefixes: prefixes(12, false),
                ipv6_prefixes: prefixes(2, true),
            }),
        );

        let ipv4 = record.ipv4.unwrap();
        assert_eq!(ipv4.total, 12);
        assert_eq!(ipv4.sample.len(), 5);
        assert_eq!(ipv4.remaining(), 7);

        let ipv6 = record.ipv6.unwrap();
        assert_eq!(ipv6.sample.len(), 2);
        assert_eq!(ipv6.remaining(), 0);
    }

    #[test]
    fn test_blank_metadata_normalized() {
        let data: AsnData = serde_json::from_str(
            r#"{"asn": 64500, "name": " ", "website": null,
                "owner_address": ["1 Example Way", "", "Springfield"],
                "rir_allocation": {"rir_name": null, "date_allocated": null}}"#,
        )
        .unwrap();
        let record = AsnRecord::new(data, None);

        assert_eq!(record.name, None);
        assert_eq!(record.owner_address, vec!["1 Example Way", "Springfield"]);
        assert_eq!(record.rir, None);
        assert!(record.ipv4.is_none() && record.ipv6.is_none());
    }
}
