//! Output and display management

use crate::analysis::{average_latency, LatencyGrade};
use crate::config::OutputConfig;
use crate::sequencer::{HopSample, PingSample};
use crate::session::Session;
use api::types::{BgpRoute, DnsRecord, DnsResponse, ReverseDnsResponse};
use crossterm::style::{Color, Stylize};

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    fn prefix(&self) -> String {
        if self.config.timestamps {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }

    /// Colour `text` by latency grade when colours are enabled
    fn graded(&self, text: String, grade: LatencyGrade) -> String {
        if !self.config.use_colors {
            return text;
        }
        let color = match grade {
            LatencyGrade::Good => Color::Green,
            LatencyGrade::Fair => Color::Yellow,
            LatencyGrade::Poor => Color::DarkYellow,
            LatencyGrade::Lost => Color::Red,
        };
        text.with(color).to_string()
    }

    fn error_line(&self, text: String) -> String {
        if self.config.use_colors {
            text.red().bold().to_string()
        } else {
            text
        }
    }

    pub fn ping_sample(&self, target: &str, sample: &PingSample) {
        let latency = match (sample.latency, &sample.error) {
            (Some(ms), _) => format!("{:.3}ms", ms),
            (None, Some(e)) => format!("lost ({})", e),
            (None, None) => "lost".to_string(),
        };
        let via = match &sample.hostname {
            Some(host) if !sample.ip_address.is_empty() => format!(" [{} ({})]", sample.ip_address, host),
            _ if !sample.ip_address.is_empty() => format!(" [{}]", sample.ip_address),
            _ => String::new(),
        };
        println!(
            "{}ping #{} {}{} -> {}",
            self.prefix(),
            sample.seq,
            target,
            via,
            self.graded(latency, LatencyGrade::of(sample.latency))
        );
    }

    pub fn ping_summary(&self, session: &Session<PingSample>) {
        let samples = session.samples();
        let lost = samples.iter().filter(|s| s.is_lost()).count();
        let avg = average_latency(samples.iter().map(|s| s.latency));

        let avg_text = match avg {
            Some(ms) => format!("{:.3}ms", ms),
            None => "no data".to_string(),
        };
        println!(
            "--- {} ({}): {} pings, {} lost, avg {}",
            session.target().unwrap_or("host"),
            session.status(),
            samples.len(),
            lost,
            self.graded(avg_text, LatencyGrade::of(avg))
        );
        self.session_error(session);
    }

    pub fn hop(&self, sample: &HopSample) {
        let address = match (&sample.ip_address, &sample.rdns) {
            (Some(ip), Some(rdns)) => format!("{} ({})", ip, rdns),
            (Some(ip), None) => ip.clone(),
            (None, _) => "*".to_string(),
        };
        let pings: Vec<String> = sample
            .pings
            .iter()
            .map(|p| match p {
                Some(ms) => self.graded(format!("{:.3}ms", ms), LatencyGrade::of(Some(*ms))),
                None => self.graded("*".to_string(), LatencyGrade::Lost),
            })
            .collect();
        let avg = match sample.average_latency() {
            Some(ms) => self.graded(format!("avg {:.3}ms", ms), LatencyGrade::of(Some(ms))),
            None => "*".to_string(),
        };
        println!("{:>3}  {:<50} {}  {}", sample.hop, address, pings.join(" "), avg);
    }

    pub fn traceroute_summary(&self, session: &Session<HopSample>) {
        let hops = session.samples();
        let reached = hops.last().is_some_and(|h| h.reached_destination());
        println!(
            "--- {} ({}): {} hops{}",
            session.target().unwrap_or("host"),
            session.status(),
            hops.len(),
            if reached { ", destination reached" } else { "" }
        );
        self.session_error(session);
    }

    fn session_error<S>(&self, session: &Session<S>) {
        if let Some(error) = session.last_error() {
            let line = format!(
                "Could not connect to {}: {}",
                session.target().unwrap_or("host"),
                error
            );
            eprintln!("{}", self.error_line(line));
        }
    }

    pub fn dns_records(&self, records: &[DnsRecord]) {
        for r in records {
            let priority = r.priority.map(|p| format!("{} ", p)).unwrap_or_default();
            let server = r
                .server
                .as_deref()
                .map(|s| format!("  ; {}", s))
                .unwrap_or_default();
            println!(
                "{:<40} {:>6} {:<6} {}{}{}",
                r.name, r.ttl, r.record_type.as_str(), priority, r.value, server
            );
        }
    }

    pub fn dns(&self, response: &DnsResponse) {
        if response.values().all(|records| records.is_empty()) {
            println!("No records found");
            return;
        }
        for records in response.values() {
            self.dns_records(records);
        }
    }

    pub fn reverse_dns(&self, ip: &str, response: &ReverseDnsResponse) {
        match response {
            ReverseDnsResponse::Hostname { hostname } => println!("{} -> {}", ip, hostname),
            ReverseDnsResponse::Trace { trace } => {
                for step in trace {
                    println!(";; {}", step.server);
                    self.dns_records(&step.records);
                }
            }
        }
    }

    pub fn bgp(&self, routes: &[BgpRoute]) {
        if routes.is_empty() {
            println!("No routes found");
            return;
        }
        for route in routes {
            println!("{}", route.prefix.as_deref().unwrap_or("(unknown prefix)"));
            println!("  Next hop:        {}", route.next_hop.as_deref().unwrap_or_default());
            println!("  AS path:         {}", join_as_path(route.as_path.as_deref()));
            println!("  Community:       {}", join_communities(route.community.as_deref()));
            println!(
                "  Large community: {}",
                join_communities(route.large_community.as_deref())
            );
            println!(
                "  Local pref:      {}",
                route.local_pref.map(|p| p.to_string()).unwrap_or_default()
            );
        }
    }
}

fn join_as_path(as_path: Option<&[u32]>) -> String {
    as_path
        .unwrap_or_default()
        .iter()
        .map(|asn| asn.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_communities(communities: Option<&[String]>) -> String {
    communities.unwrap_or_default().join(" - ")
}
