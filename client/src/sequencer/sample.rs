//! Sample data structures

use crate::analysis::average_latency;
use api::types::{PingResponse, TracerouteResponse};
use serde::{Deserialize, Serialize};

/// Result of one ping probe. `latency == None` marks a sentinel (lost) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingSample {
    /// 1-based probe number within the run
    pub seq: u32,

    /// Round-trip time in milliseconds (None if the ping was lost)
    pub latency: Option<f64>,

    /// Address the backend resolved the target to
    pub ip_address: String,

    /// Reverse DNS of the target, if available
    pub hostname: Option<String>,

    /// Why the probe was lost
    pub error: Option<String>,
}

impl PingSample {
    pub fn from_response(seq: u32, response: PingResponse) -> Self {
        let Some(reply) = response.into_iter().next() else {
            return Self {
                seq,
                latency: None,
                ip_address: String::new(),
                hostname: None,
                error: Some("empty ping response".to_string()),
            };
        };

        let latency = match (&reply.error, reply.latency) {
            (None, Some(v)) if v.is_finite() && v >= 0.0 => Some(v),
            _ => None,
        };

        let error = match (&reply.error, latency) {
            (Some(e), _) if e.is_timeout => Some("timeout".to_string()),
            (Some(e), _) => Some(e.message.clone()),
            (None, None) => Some("no reply".to_string()),
            (None, Some(_)) => None,
        };

        Self {
            seq,
            latency,
            ip_address: reply.ip_address,
            hostname: reply.hostname,
            error,
        }
    }

    pub fn is_lost(&self) -> bool {
        self.latency.is_none()
    }
}

/// Result of one traceroute hop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopSample {
    /// 1-based hop number (TTL)
    pub hop: u32,

    /// Address that answered at this hop (None if nothing answered)
    pub ip_address: Option<String>,

    pub rdns: Option<String>,

    /// Latency of each ping sent to this hop (None if lost)
    pub pings: Vec<Option<f64>>,

    /// Destination address of the whole route as reported by the backend
    pub destination_ip: String,
}

impl HopSample {
    pub fn from_response(hop: u32, response: TracerouteResponse) -> Self {
        let item = response.traceroute.into_iter().next();

        let (ip_address, rdns, pings) = match item {
            Some(item) => {
                let pings = item
                    .pings
                    .into_iter()
                    .map(|p| p.filter(|v| v.is_finite() && *v >= 0.0))
                    .collect();
                let rdns = item.rdns.filter(|r| !r.is_empty());
                (Some(item.ip_address), rdns, pings)
            }
            None => (None, None, Vec::new()),
        };

        Self {
            hop,
            ip_address,
            rdns,
            pings,
            destination_ip: response.destination_ip,
        }
    }

    /// True when the answering address is the route's destination
    pub fn reached_destination(&self) -> bool {
        self.ip_address.as_deref() == Some(self.destination_ip.as_str())
    }

    pub fn average_latency(&self) -> Option<f64> {
        average_latency(self.pings.iter().copied())
    }
}
