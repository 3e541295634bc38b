//! MikroTik Exporter Binary Entry Point
//!
//! Serves Prometheus metrics for one or more RouterOS devices.
//! Core functionality is provided by the `mikrotik_exporter` library crate.

use clap::{Parser, ValueEnum};
use mikrotik_exporter::{
    client::RouterOsConnector,
    collector::{CollectorRegistry, Feature, FeatureSet},
    config::{AppConfig, ConfigError, DeviceFlags, parse_duration, parse_listen_address},
    engine::Engine,
    metrics::exporter_registry,
    server::{AppState, create_router},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status for configuration errors.
const EXIT_CONFIG: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

/// Prometheus exporter for MikroTik RouterOS devices
#[derive(Parser, Debug)]
#[command(name = "mikrotik-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, env = "MIKROTIK_EXPORTER_CONFIG")]
    config_file: Option<String>,

    /// Single device name
    #[arg(long)]
    device: Option<String>,

    /// Single device address
    #[arg(long)]
    address: Option<String>,

    /// Single device user
    #[arg(long, env = "MIKROTIK_USER")]
    user: Option<String>,

    /// Single device password
    #[arg(long, env = "MIKROTIK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Single device API port
    #[arg(long, default_value_t = mikrotik_exporter::client::DEFAULT_API_PORT)]
    deviceport: u16,

    /// Address to listen on for web interface and telemetry
    #[arg(long, default_value = ":9436")]
    port: String,

    /// Path under which to expose metrics
    #[arg(long, default_value = "/metrics")]
    path: String,

    /// Timeout when connecting to devices (overrides config file)
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Use TLS to connect to devices
    #[arg(long)]
    tls: bool,

    /// Skip TLS certificate verification
    #[arg(long)]
    insecure: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(flatten)]
    features: FeatureFlags,
}

/// One switch per optional feature.
#[derive(clap::Args, Debug, Default)]
struct FeatureFlags {
    /// Retrieves BGP routing information
    #[arg(long)]
    with_bgp: bool,
    /// Retrieves connection tracking metrics
    #[arg(long)]
    with_conntrack: bool,
    /// Retrieves DHCP server metrics
    #[arg(long)]
    with_dhcp: bool,
    /// Retrieves DHCP server lease metrics
    #[arg(long)]
    with_dhcpl: bool,
    /// Retrieves DHCPv6 server metrics
    #[arg(long)]
    with_dhcpv6: bool,
    /// Retrieves firmware versions
    #[arg(long)]
    with_firmware: bool,
    /// Retrieves board health metrics
    #[arg(long)]
    with_health: bool,
    /// Retrieves routing table information
    #[arg(long)]
    with_routes: bool,
    /// Retrieves PoE metrics
    #[arg(long)]
    with_poe: bool,
    /// Retrieves IP(v6) pool metrics
    #[arg(long)]
    with_pools: bool,
    /// Retrieves optical diagnostic metrics
    #[arg(long)]
    with_optics: bool,
    /// Retrieves w60g interface metrics
    #[arg(long)]
    with_w60g: bool,
    /// Retrieves connected wlan station metrics
    #[arg(long)]
    with_wlansta: bool,
    /// Retrieves wlan interface metrics
    #[arg(long)]
    with_wlanif: bool,
    /// Retrieves capsman station metrics
    #[arg(long)]
    with_capsman: bool,
    /// Retrieves ethernet interface monitor info
    #[arg(long)]
    with_monitor: bool,
    /// Retrieves ipsec metrics
    #[arg(long)]
    with_ipsec: bool,
    /// Retrieves lte metrics
    #[arg(long)]
    with_lte: bool,
    /// Retrieves netwatch metrics
    #[arg(long)]
    with_netwatch: bool,
}

impl FeatureFlags {
    fn to_feature_set(&self) -> FeatureSet {
        [
            (self.with_bgp, Feature::Bgp),
            (self.with_conntrack, Feature::Conntrack),
            (self.with_dhcp, Feature::Dhcp),
            (self.with_dhcpl, Feature::Dhcpl),
            (self.with_dhcpv6, Feature::Dhcpv6),
            (self.with_firmware, Feature::Firmware),
            (self.with_health, Feature::Health),
            (self.with_routes, Feature::Routes),
            (self.with_poe, Feature::Poe),
            (self.with_pools, Feature::Pools),
            (self.with_optics, Feature::Optics),
            (self.with_w60g, Feature::W60g),
            (self.with_wlansta, Feature::Wlansta),
            (self.with_wlanif, Feature::Wlanif),
            (self.with_capsman, Feature::Capsman),
            (self.with_monitor, Feature::Monitor),
            (self.with_ipsec, Feature::Ipsec),
            (self.with_lte, Feature::Lte),
            (self.with_netwatch, Feature::Netwatch),
        ]
        .into_iter()
        .filter_map(|(enabled, feature)| enabled.then_some(feature))
        .collect()
    }
}

/// Everything resolved from flags and the config file before startup.
struct Settings {
    config: AppConfig,
    features: FeatureSet,
    listen: SocketAddr,
    metrics_path: String,
}

fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            AppConfig::load(path)?
        }
        None => AppConfig::single_device(DeviceFlags {
            name: cli.device.clone(),
            address: cli.address.clone(),
            user: cli.user.clone(),
            password: cli.password.clone(),
            port: Some(cli.deviceport),
        })?,
    };

    // CLI switches only ever turn things on; an explicit timeout wins.
    config.options.tls |= cli.tls;
    config.options.insecure |= cli.insecure;
    if let Some(timeout) = cli.timeout {
        config.options.timeout = timeout;
    }
    config.validate()?;

    if !cli.path.starts_with('/') || cli.path == "/" || cli.path == "/healthz" {
        return Err(ConfigError::ValidationError(format!(
            "invalid metrics path: '{}'",
            cli.path
        )));
    }

    Ok(Settings {
        features: config.features.merge(&cli.features.to_feature_set()),
        listen: parse_listen_address(&cli.port)?,
        metrics_path: cli.path.clone(),
        config,
    })
}

fn init_tracing(format: LogFormat, level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.log_format, &cli.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "MikroTik Exporter");

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Could not load configuration");
            std::process::exit(EXIT_CONFIG);
        }
    };
    let options = &settings.config.options;

    tracing::info!(
        devices = settings.config.devices.len(),
        features = %settings.features,
        timeout_ms = options.timeout.as_millis(),
        tls = options.tls,
        reuse_connections = options.reuse_connections,
        "Configuration loaded"
    );

    let connector = RouterOsConnector::new(options.connect_options())?;
    let engine = Arc::new(Engine::new(
        settings.config.devices.clone(),
        CollectorRegistry::from_features(&settings.features),
        Arc::new(connector),
        options.engine_options(),
    ));

    let app_state = AppState {
        engine: Arc::clone(&engine),
        metrics_path: settings.metrics_path.clone(),
        exporter: exporter_registry()?,
        scrape_timeout: options.scrape_timeout,
        scrape_timeout_offset: options.scrape_timeout_offset,
    };

    // Build Axum router
    let app = create_router(app_state);

    tracing::info!(
        "Listening on: http://{}{}",
        settings.listen,
        settings.metrics_path
    );
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(settings.listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_device_from_flags() {
        let cli = Cli::parse_from([
            "mikrotik-exporter",
            "--device",
            "edge",
            "--address",
            "192.168.88.1",
            "--user",
            "prometheus",
            "--password",
            "secret",
            "--with-bgp",
            "--with-netwatch",
            "--port",
            "127.0.0.1:9500",
        ]);
        let settings = load_settings(&cli).unwrap();

        assert_eq!(settings.config.devices[0].name, "edge");
        assert_eq!(settings.listen.to_string(), "127.0.0.1:9500");
        assert!(settings.features.contains(Feature::Bgp));
        assert!(settings.features.contains(Feature::Netwatch));
        assert!(!settings.features.contains(Feature::Dhcp));
        assert_eq!(settings.metrics_path, "/metrics");
    }

    #[test]
    fn test_config_file_features_merge_with_flags() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "devices:\n  - { name: a, address: 10.0.0.1, user: u, password: p }\nfeatures:\n  dhcp: true\n",
        )
        .unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::parse_from([
            "mikrotik-exporter",
            "--config-file",
            &path,
            "--with-lte",
            "--tls",
            "--timeout",
            "3s",
        ]);
        let settings = load_settings(&cli).unwrap();

        assert!(settings.features.contains(Feature::Dhcp));
        assert!(settings.features.contains(Feature::Lte));
        assert!(settings.config.options.tls);
        assert_eq!(settings.config.options.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_metrics_path_rejected() {
        let cli = Cli::parse_from([
            "mikrotik-exporter",
            "--device",
            "edge",
            "--address",
            "192.168.88.1",
            "--user",
            "u",
            "--password",
            "p",
            "--path",
            "metrics",
        ]);
        assert!(load_settings(&cli).is_err());
    }
}
