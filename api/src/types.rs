//! Backend response structures
//!
//! One type per endpoint. Field names follow the JSON the backend emits.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Error object attached to a single failed ping
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PingError {
    #[serde(default)]
    pub is_timeout: bool,
    #[serde(default)]
    pub message: String,
}

/// One element of the `GET /ping/:host` response array
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PingReply {
    /// Round-trip time in milliseconds (None if the ping was lost)
    #[serde(default)]
    pub latency: Option<f64>,
    #[serde(default)]
    pub ip_address: String,
    /// None if reverse DNS is unavailable
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub error: Option<PingError>,
}

/// `GET /ping/:host`
pub type PingResponse = Vec<PingReply>;

/// One hop in a traceroute response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TraceItem {
    /// Latency of each ping sent to this hop (None if lost)
    #[serde(default)]
    pub pings: Vec<Option<f64>>,
    #[serde(default)]
    pub rdns: Option<String>,
    pub ip_address: String,
}

/// `GET /traceroute/:host?hop=N`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TracerouteResponse {
    pub destination_ip: String,
    #[serde(default)]
    pub traceroute: Vec<TraceItem>,
}

/// `GET /whois/:host`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WhoisResponse {
    pub result: String,
}

/// DNS record types understood by `GET /dns/:type/:host`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsType {
    Any,
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Srv,
    Trace,
    Txt,
}

impl DnsType {
    pub const ALL: [DnsType; 11] = [
        DnsType::Any,
        DnsType::A,
        DnsType::Aaaa,
        DnsType::Cname,
        DnsType::Mx,
        DnsType::Ns,
        DnsType::Ptr,
        DnsType::Soa,
        DnsType::Srv,
        DnsType::Trace,
        DnsType::Txt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DnsType::Any => "ANY",
            DnsType::A => "A",
            DnsType::Aaaa => "AAAA",
            DnsType::Cname => "CNAME",
            DnsType::Mx => "MX",
            DnsType::Ns => "NS",
            DnsType::Ptr => "PTR",
            DnsType::Soa => "SOA",
            DnsType::Srv => "SRV",
            DnsType::Trace => "TRACE",
            DnsType::Txt => "TXT",
        }
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DnsType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        DnsType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ApiError::UnknownDnsType(s.to_string()))
    }
}

/// SOA record payload
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SoaValue {
    pub expire: u64,
    pub mbox: String,
    pub minttl: u64,
    pub ns: String,
    pub refresh: u64,
    pub retry: u64,
    pub serial: u64,
}

/// A record value is plain text, a list (e.g. TXT chunks), an SOA object,
/// or any other structured payload such as SRV
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DnsValue {
    Text(String),
    List(Vec<String>),
    Soa(SoaValue),
    Other(serde_json::Value),
}

impl fmt::Display for DnsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsValue::Text(s) => f.write_str(s),
            DnsValue::List(items) => f.write_str(&items.join(" ")),
            DnsValue::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.ns, soa.mbox, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minttl
            ),
            DnsValue::Other(value) => {
                let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: DnsType,
    pub ttl: u32,
    #[serde(default)]
    pub priority: Option<u32>,
    pub name: String,
    pub value: DnsValue,
    /// Server that answered (only present on traces)
    #[serde(default, alias = "dnsServer")]
    pub server: Option<String>,
}

/// `GET /dns/:type/:host` - records grouped by type
pub type DnsResponse = BTreeMap<DnsType, Vec<DnsRecord>>;

/// Records returned by one server along a reverse DNS trace
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DnsServerRecords {
    pub server: String,
    #[serde(default)]
    pub records: Vec<DnsRecord>,
}

/// `GET /rdns/:ip`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ReverseDnsResponse {
    Trace { trace: Vec<DnsServerRecords> },
    Hostname { hostname: String },
}

/// One route returned by `GET /bgp/:ip`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BgpRoute {
    #[serde(default)]
    pub prefix: Option<String>,
    /// AS numbers, nearest first
    #[serde(default)]
    pub as_path: Option<Vec<u32>>,
    #[serde(default)]
    pub local_pref: Option<u32>,
    #[serde(default)]
    pub next_hop: Option<String>,
    /// Communities as `asn:value` strings
    #[serde(default)]
    pub community: Option<Vec<String>>,
    #[serde(default)]
    pub large_community: Option<Vec<String>>,
}

/// `GET /bgp/:ip`
pub type BgpResponse = Vec<BgpRoute>;

/// `GET /ip`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IpResponse {
    #[serde(alias = "ip_address")]
    pub ip: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_reply_with_lost_latency() {
        let json = r#"[{"ip_address": "1.1.1.1", "hostname": null, "error": {"is_timeout": true, "message": "timeout"}}]"#;
        let reply: PingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(reply.len(), 1);
        assert_eq!(reply[0].latency, None);
        assert!(reply[0].error.as_ref().unwrap().is_timeout);
    }

    #[test]
    fn test_traceroute_response() {
        let json = r#"{
            "destination_ip": "1.1.1.1",
            "traceroute": [{"pings": [1.5, null, 2.5], "rdns": "one.one.one.one", "ip_address": "1.1.1.1"}]
        }"#;
        let resp: TracerouteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.traceroute[0].pings, vec![Some(1.5), None, Some(2.5)]);
        assert_eq!(resp.traceroute[0].rdns.as_deref(), Some("one.one.one.one"));
    }

    #[test]
    fn test_dns_values() {
        let json = r#"{
            "A": [{"type": "A", "ttl": 300, "name": "example.com.", "value": "93.184.216.34"}],
            "TXT": [{"type": "TXT", "ttl": 60, "name": "example.com.", "value": ["v=spf1", "-all"]}],
            "SOA": [{"type": "SOA", "ttl": 3600, "name": "example.com.", "dnsServer": "a.root-servers.net",
                     "value": {"expire": 1, "mbox": "m.", "minttl": 2, "ns": "ns.", "refresh": 3, "retry": 4, "serial": 5}}]
        }"#;
        let resp: DnsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp[&DnsType::A][0].value, DnsValue::Text("93.184.216.34".into()));
        assert_eq!(resp[&DnsType::Txt][0].value.to_string(), "v=spf1 -all");
        let soa = &resp[&DnsType::Soa][0];
        assert!(matches!(soa.value, DnsValue::Soa(SoaValue { serial: 5, .. })));
        assert_eq!(soa.server.as_deref(), Some("a.root-servers.net"));
    }

    #[test]
    fn test_dns_srv_record() {
        let json = r#"{"SRV": [{"type": "SRV", "ttl": 300, "name": "_sip._udp.example.com.",
                        "value": {"priority": 10, "weight": 5, "port": 5060, "target": "sip.example.com."}}]}"#;
        let resp: DnsResponse = serde_json::from_str(json).unwrap();
        let srv = &resp[&DnsType::Srv][0];
        assert!(matches!(srv.value, DnsValue::Other(_)));
        assert_eq!(
            srv.value.to_string(),
            r#"{"port":5060,"priority":10,"target":"sip.example.com.","weight":5}"#
        );
    }

    #[test]
    fn test_dns_type_parse() {
        assert_eq!("aaaa".parse::<DnsType>().unwrap(), DnsType::Aaaa);
        assert_eq!(" MX ".parse::<DnsType>().unwrap(), DnsType::Mx);
        assert!("AXFR".parse::<DnsType>().is_err());
    }

    #[test]
    fn test_reverse_dns_variants() {
        let hostname: ReverseDnsResponse =
            serde_json::from_str(r#"{"hostname": "one.one.one.one"}"#).unwrap();
        assert_eq!(
            hostname,
            ReverseDnsResponse::Hostname { hostname: "one.one.one.one".into() }
        );

        let trace: ReverseDnsResponse = serde_json::from_str(
            r#"{"trace": [
                {"server": "a.root-servers.net", "records": [
                    {"type": "NS", "ttl": 172800, "name": "in-addr.arpa.", "value": "b.in-addr-servers.arpa."}
                ]},
                {"server": "ns3.cloudflare.com", "records": [
                    {"type": "PTR", "ttl": 1800, "name": "1.1.1.1.in-addr.arpa.", "value": "one.one.one.one."}
                ]}
            ]}"#,
        )
        .unwrap();
        let ReverseDnsResponse::Trace { trace } = trace else {
            panic!("expected a trace");
        };
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].server, "a.root-servers.net");
        assert_eq!(trace[1].records[0].record_type, DnsType::Ptr);
        assert_eq!(trace[1].records[0].value.to_string(), "one.one.one.one.");
    }

    #[test]
    fn test_bgp_route_with_nulls() {
        let json = r#"[{"prefix": null, "as_path": null, "local_pref": 100,
                        "next_hop": null, "community": null, "large_community": null}]"#;
        let routes: BgpResponse = serde_json::from_str(json).unwrap();
        assert_eq!(routes[0].prefix, None);
        assert_eq!(routes[0].next_hop, None);
        assert_eq!(routes[0].as_path, None);
        assert_eq!(routes[0].local_pref, Some(100));
    }

    #[test]
    fn test_bgp_route() {
        let json = r#"[{"prefix": "1.1.1.0/24", "as_path": [64512, 13335], "local_pref": 100,
                        "next_hop": "10.0.0.1", "community": ["13335:10", "13335:20"],
                        "large_community": ["13335:1:2"]}]"#;
        let routes: BgpResponse = serde_json::from_str(json).unwrap();
        let route = &routes[0];
        assert_eq!(route.prefix.as_deref(), Some("1.1.1.0/24"));
        assert_eq!(route.as_path, Some(vec![64512, 13335]));
        assert_eq!(route.next_hop.as_deref(), Some("10.0.0.1"));
        assert_eq!(route.community.as_ref().unwrap().len(), 2);
        assert_eq!(route.large_community.as_deref(), Some(&["13335:1:2".to_string()][..]));
    }

    #[test]
    fn test_ip_response_alias() {
        let a: IpResponse = serde_json::from_str(r#"{"ip": "192.0.2.1"}"#).unwrap();
        let b: IpResponse = serde_json::from_str(r#"{"ip_address": "192.0.2.1"}"#).unwrap();
        assert_eq!(a, b);
    }
}
