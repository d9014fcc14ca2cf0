use clap::{Parser, Subcommand};
use polydns_application::ports::DnsCachePort;
use polydns_application::use_cases::dns::DEFAULT_CLIENT_IP;
use polydns_domain::config::CliOverrides;
use polydns_domain::{Config, Protocol, RecordType};
use polydns_jobs::{CacheSweepJob, JobRunner};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;
mod server;

#[derive(Parser)]
#[command(name = "polydns")]
#[command(version)]
#[command(about = "polydns - multi-protocol DNS resolver (UDP, DoT, DoH, DoQ)")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'd', long, global = true)]
    dns_port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long, global = true)]
    bind: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the DNS listener (default)
    Serve,

    /// Resolve a name once and print the records as JSON
    Lookup {
        domain: String,

        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: String,

        /// standard, custom, dot, doh or doq
        #[arg(short, long)]
        protocol: Option<String>,

        /// Upstream server overriding the configured one
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Resolve the PTR records of an address
    Reverse {
        ip: IpAddr,

        #[arg(short, long)]
        protocol: Option<String>,
    },

    /// Check an encrypted upstream
    Check {
        #[command(subcommand)]
        target: CheckTarget,
    },
}

#[derive(Subcommand)]
enum CheckTarget {
    /// TLS handshake and certificate fingerprint
    Dot {
        host: String,
        #[arg(long, default_value_t = 853)]
        port: u16,
        #[arg(long)]
        servername: Option<String>,
    },
    /// example.com A through a DoH server
    Doh {
        host: String,
        #[arg(long, default_value = "/dns-query")]
        path: String,
    },
    /// QUIC availability
    Doq {
        host: String,
        #[arg(long, default_value_t = 853)]
        port: u16,
    },
    /// Protocols usable under the current configuration
    Protocols,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.dns_port,
        bind_address: cli.bind.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    let repos = di::Repositories::new(&config);
    let dns_services = di::DnsServices::new(&config, &repos);
    let use_cases = di::UseCases::new(&config, &repos, &dns_services);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config_path = cli
                .config
                .clone()
                .or_else(|| Config::get_config_path().map(str::to_string));
            serve(&config, config_path, &dns_services, &use_cases).await
        }
        Command::Lookup {
            domain,
            record_type,
            protocol,
            server,
        } => {
            let record_type: RecordType = record_type.parse().map_err(anyhow::Error::msg)?;
            let protocol = parse_protocol(protocol.as_deref())?;
            let records = dns_services
                .engine
                .lookup(
                    &domain,
                    record_type,
                    DEFAULT_CLIENT_IP,
                    protocol,
                    server.as_deref(),
                )
                .await?;
            print_json(&records)
        }
        Command::Reverse { ip, protocol } => {
            let protocol = parse_protocol(protocol.as_deref())?;
            let records = dns_services
                .engine
                .reverse(ip, DEFAULT_CLIENT_IP, protocol)
                .await?;
            print_json(&records)
        }
        Command::Check { target } => check(target, &use_cases).await,
    }
}

async fn serve(
    config: &Config,
    config_path: Option<String>,
    dns_services: &di::DnsServices,
    use_cases: &di::UseCases,
) -> anyhow::Result<()> {
    info!("Starting polydns v{}", env!("CARGO_PKG_VERSION"));

    let shutdown = CancellationToken::new();

    let cache: Arc<dyn DnsCachePort> = dns_services.cache.clone();
    let sweep = CacheSweepJob::new(cache)
        .with_interval(config.dns.cache.cleanup_interval_secs)
        .with_cancellation(shutdown.clone());
    let job_handles = JobRunner::new()
        .with_cache_sweep(sweep)
        .with_shutdown_token(shutdown.clone())
        .start();

    let reload_task = tokio::spawn(server::signals::reload_on_hangup(
        use_cases.reload.clone(),
        config_path,
        shutdown.clone(),
    ));

    let server_shutdown = shutdown.clone();
    let server_config = config.server.clone();
    let handler = dns_services.handler();
    let mut dns_task = tokio::spawn(async move {
        server::start_dns_server(&server_config, handler, server_shutdown).await
    });

    let outcome = tokio::select! {
        _ = server::signals::wait_for_shutdown() => Ok(()),
        joined = &mut dns_task => match joined {
            Ok(result) => result,
            Err(e) => Err(anyhow::anyhow!("DNS server task failed: {}", e)),
        },
    };

    info!("Shutting down...");
    shutdown.cancel();

    if !dns_task.is_finished() {
        if let Ok(Err(e)) = dns_task.await {
            error!(error = %e, "DNS server error during shutdown");
        }
    }
    for handle in job_handles {
        let _ = handle.await;
    }
    let _ = reload_task.await;

    info!("Shutdown complete");
    outcome
}

async fn check(target: CheckTarget, use_cases: &di::UseCases) -> anyhow::Result<()> {
    let diagnostics = &use_cases.diagnostics;
    match target {
        CheckTarget::Dot {
            host,
            port,
            servername,
        } => print_json(
            &diagnostics
                .test_dot_connection(&host, port, servername.as_deref())
                .await,
        ),
        CheckTarget::Doh { host, path } => {
            print_json(&diagnostics.test_doh_connection(&host, &path).await)
        }
        CheckTarget::Doq { host, port } => {
            print_json(&diagnostics.test_doq_connection(&host, port).await)
        }
        CheckTarget::Protocols => print_json(&diagnostics.supported_protocols()),
    }
}

fn parse_protocol(name: Option<&str>) -> anyhow::Result<Option<Protocol>> {
    name.map(|n| n.parse::<Protocol>().map_err(anyhow::Error::msg))
        .transpose()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
