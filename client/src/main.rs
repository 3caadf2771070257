//! ktools - network diagnostic tools client
//!
//! Runs ping, traceroute, WHOIS, DNS, reverse DNS and BGP lookups through a
//! regional looking-glass backend.

mod analysis;
mod config;
mod lookup;
mod output;
mod request;
mod sequencer;
mod session;

use anyhow::{Context, Result};
use api::types::DnsType;
use clap::{Parser, Subcommand};
use sequencer::{HopTarget, PingSettings, ProbeTask, TracerouteSettings};
use session::{Session, Status};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ktools")]
#[command(version)]
#[command(about = "Network diagnostic tools through a looking-glass backend", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "ktools.conf")]
    config: PathBuf,

    /// Server location to run from (see `ktools locations`)
    #[arg(short, long, global = true)]
    location: Option<String>,

    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ping a host from the backend
    Ping {
        host: String,

        /// Number of pings
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        count: Option<u32>,

        /// Time between pings in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Trace the route from the backend to a host, one hop at a time
    Traceroute {
        host: String,

        /// Hop ceiling
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_hops: Option<u32>,

        /// Address each hop probes
        #[arg(long, value_enum)]
        hop_target: Option<HopTarget>,
    },

    /// WHOIS lookup
    Whois { host: String },

    /// DNS lookup
    Dns {
        host: String,

        /// Record type: ANY, A, AAAA, CNAME, MX, NS, PTR, SOA, SRV, TRACE, TXT
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: DnsType,

        /// Trace the resolution from the root servers
        #[arg(long)]
        trace: bool,
    },

    /// Reverse DNS lookup
    Rdns {
        ip: String,

        /// Trace the resolution from the root servers
        #[arg(long)]
        trace: bool,
    },

    /// BGP route lookup
    Bgp { ip: String },

    /// Show the address the backend sees you as
    Ip,

    /// List configured server locations
    Locations,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Load configuration
    let mut config = config::Config::load_or_default(&args.config)?;
    if args.no_color {
        config.output.use_colors = false;
    }

    // Initialize tracing (stderr, so results on stdout stay clean)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.logging.level.parse()?),
        )
        .init();

    debug!("Loaded configuration from {:?}", args.config);

    let registry = config.location_registry()?;
    info!("{} server locations available", registry.len());

    let client = Arc::new(
        request::ApiClient::new(
            registry,
            Duration::from_millis(config.general.request_timeout_ms),
        )
        .context("Failed to create HTTP client")?,
    );

    let location_id = args
        .location
        .clone()
        .or_else(|| config.general.default_location.clone());
    let location = client.location(location_id.as_deref())?.id.clone();

    let output = output::OutputManager::new(config.output.clone());

    match args.command {
        Command::Ping {
            host,
            count,
            interval_ms,
        } => {
            let host = api::validate::host(&host)?;
            let mut settings = PingSettings::from(&config.ping);
            if let Some(count) = count {
                settings.max_samples = count as usize;
            }
            if let Some(ms) = interval_ms {
                settings.interval = Duration::from_millis(ms);
            }

            let task = sequencer::start_ping(client, &host, &location, settings);
            let session = drive(task, |sample| output.ping_sample(&host, sample)).await;
            output.ping_summary(&session);
            Ok(exit_code(&session))
        }

        Command::Traceroute {
            host,
            max_hops,
            hop_target,
        } => {
            let host = api::validate::host(&host)?;
            let mut settings = TracerouteSettings::from(&config.traceroute);
            if let Some(max_hops) = max_hops {
                settings.max_hops = max_hops;
            }
            if let Some(hop_target) = hop_target {
                settings.hop_target = hop_target;
            }

            let task = sequencer::start_traceroute(client, &host, &location, settings);
            let session = drive(task, |hop| output.hop(hop)).await;
            output.traceroute_summary(&session);
            Ok(exit_code(&session))
        }

        Command::Whois { host } => {
            let host = api::validate::host(&host)?;
            let result = client
                .whois(&host, Some(&location))
                .await
                .with_context(|| format!("WHOIS lookup for {} failed", host))?;
            println!("{}", result);
            Ok(ExitCode::SUCCESS)
        }

        Command::Dns {
            host,
            record_type,
            trace,
        } => {
            let host = api::validate::host(&host)?;
            let records = client
                .dns(record_type, &host, trace, Some(&location))
                .await
                .with_context(|| format!("DNS lookup for {} failed", host))?;
            output.dns(&records);
            Ok(ExitCode::SUCCESS)
        }

        Command::Rdns { ip, trace } => {
            let ip = api::validate::ip(&ip)?;
            let response = client
                .reverse_dns(ip, trace, Some(&location))
                .await
                .with_context(|| format!("Reverse DNS lookup for {} failed", ip))?;
            output.reverse_dns(&ip.to_string(), &response);
            Ok(ExitCode::SUCCESS)
        }

        Command::Bgp { ip } => {
            let ip = api::validate::ip(&ip)?;
            let routes = client
                .bgp(ip, Some(&location))
                .await
                .with_context(|| format!("BGP lookup for {} failed", ip))?;
            output.bgp(&routes);
            Ok(ExitCode::SUCCESS)
        }

        Command::Ip => {
            let ip = client
                .own_ip(Some(&location))
                .await
                .context("Failed to query own IP address")?;
            println!("{}", ip);
            Ok(ExitCode::SUCCESS)
        }

        Command::Locations => {
            let default = client.registry().default_location().id.clone();
            for l in client.registry().iter() {
                println!(
                    "{:<12} {:<16} {}{}",
                    l.id,
                    l.name,
                    l.url.as_deref().unwrap_or("(same origin)"),
                    if l.id == default { "  [default]" } else { "" }
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print samples as they arrive until the run ends or Ctrl+C cancels it
async fn drive<S, F>(mut task: ProbeTask<S>, mut on_sample: F) -> Session<S>
where
    S: Clone,
    F: FnMut(&S),
{
    let mut cancelled = false;
    loop {
        tokio::select! {
            sample = task.next_sample() => match sample {
                Some(sample) => on_sample(&sample),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !cancelled => {
                info!("Interrupted, stopping");
                task.cancel();
                cancelled = true;
            }
        }
    }
    task.join().await
}

fn exit_code<S>(session: &Session<S>) -> ExitCode {
    if session.status() == Status::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_zero_limits_rejected() {
        assert!(Args::try_parse_from(["ktools", "ping", "-n", "0", "example.com"]).is_err());
        assert!(Args::try_parse_from(["ktools", "traceroute", "--max-hops", "0", "example.com"]).is_err());
    }

    #[test]
    fn test_limits_parsed() {
        let args = Args::try_parse_from(["ktools", "ping", "-n", "3", "example.com"]).unwrap();
        assert!(matches!(args.command, Command::Ping { count: Some(3), .. }));

        let args =
            Args::try_parse_from(["ktools", "traceroute", "--max-hops", "5", "example.com"]).unwrap();
        assert!(matches!(args.command, Command::Traceroute { max_hops: Some(5), .. }));
    }
}
