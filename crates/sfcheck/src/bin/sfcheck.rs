//! sfcheck - health check for Element storage clusters and nodes.
//!
//! Prints a table on a terminal and a single status line otherwise, and
//! exits with the monitoring-plugin code of the worst result.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

use element::rpc::{DEFAULT_API_VERSION, DEFAULT_PORT};
use element::{ElementRpc, MetricSource, RpcOptions, Snapshot, SnapshotSource};
use sfcheck::{
    render_error, CheckConfig, CheckError, Mode, OutputFormat, Report, Severity, Target,
};

/// Where metrics come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SourceKind {
    /// Live JSON-RPC endpoint.
    Rpc,
    /// Previously recorded snapshot file.
    Snapshot,
}

/// Element storage health check.
#[derive(Parser)]
#[command(name = "sfcheck", version)]
#[command(about = "Check an Element storage cluster or node and exit with a monitoring-plugin status")]
struct Cli {
    /// Cluster MVIP or node management address (IP or hostname).
    host: String,

    /// Management HTTPS port.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Cluster admin user (or set `SFCHECK_USERNAME`).
    #[arg(short, long, env = "SFCHECK_USERNAME")]
    username: Option<String>,

    /// Cluster admin password (or set `SFCHECK_PASSWORD`).
    #[arg(short, long, env = "SFCHECK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Check the whole cluster or a single node.
    #[arg(short, long, value_enum, default_value_t = Mode::Cluster)]
    mode: Mode,

    /// Metric source. Defaults to `snapshot` when `--snapshot` is given.
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Snapshot file to read instead of a live endpoint.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Capture the live answers to this snapshot file before checking.
    #[arg(long, conflicts_with = "snapshot")]
    record: Option<PathBuf>,

    /// JSON-RPC API version in the endpoint path.
    #[arg(long, default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// Request timeout in seconds.
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Accept self-signed TLS certificates.
    #[arg(long, default_value = "false")]
    insecure: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// TOML configuration file (or set `SFCHECK_CONFIG`).
    #[arg(short, long, env = "SFCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for disk activity baselines.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Enable the disk activity check.
    #[arg(long, default_value = "false")]
    disk_activity: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

impl Cli {
    fn source_kind(&self) -> SourceKind {
        match (self.source, &self.snapshot) {
            (Some(kind), _) => kind,
            (None, Some(_)) => SourceKind::Snapshot,
            (None, None) => SourceKind::Rpc,
        }
    }

    fn check_config(&self) -> Result<CheckConfig, CheckError> {
        let mut config = CheckConfig::load_or_default(self.config.as_deref())?;
        if self.disk_activity {
            config.checks.disk_activity = true;
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir.clone_from(dir);
        }
        Ok(config)
    }

    fn rpc(&self) -> Result<ElementRpc, CheckError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Err(CheckError::Configuration(
                "username and password are required for the rpc source".into(),
            ));
        };

        let url = ElementRpc::endpoint(self.host.trim(), self.port, &self.api_version)?;
        let options = RpcOptions {
            timeout_secs: self.timeout,
            accept_invalid_certs: self.insecure,
        };
        Ok(ElementRpc::new(url, username, password, options)?)
    }
}

/// Argument errors are reported as UNKNOWN like any other configuration
/// problem. Help and version requests are not errors.
fn usage_error(err: &clap::Error) -> Option<CheckError> {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => None,
        _ => {
            // first paragraph only; the rest is usage and tips
            let text = err.to_string();
            let message = text
                .lines()
                .map(str::trim)
                .take_while(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let message = message.strip_prefix("error: ").unwrap_or(&message);
            Some(CheckError::Configuration(message.to_string()))
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // stdout belongs to the plugin output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))
        .context("failed to initialize logging")
}

async fn execute(cli: &Cli) -> Result<Report, CheckError> {
    let config = cli.check_config()?;
    let target = Target::new(cli.host.trim(), cli.port, cli.mode);

    match cli.source_kind() {
        SourceKind::Snapshot => {
            let path = cli.snapshot.as_ref().ok_or_else(|| {
                CheckError::Configuration("--source snapshot needs --snapshot <file>".into())
            })?;
            let source = SnapshotSource::open(path).await?;
            sfcheck::run(&source, &target, &config).await
        }
        SourceKind::Rpc => {
            let ip = target.resolve().await?;
            let rpc = cli.rpc()?;
            debug!(host = %target.host, %ip, url = %rpc.url(), "Using JSON-RPC source");

            match &cli.record {
                Some(path) => {
                    let snapshot = record(&rpc, cli.mode).await?;
                    snapshot.save(path)?;
                    let source = SnapshotSource::from_snapshot(path, snapshot);
                    sfcheck::run(&source, &target, &config).await
                }
                None => sfcheck::run(&rpc, &target, &config).await,
            }
        }
    }
}

async fn record(source: &dyn MetricSource, mode: Mode) -> Result<Snapshot, CheckError> {
    let snapshot = match mode {
        Mode::Cluster => Snapshot::capture_cluster(source).await?,
        Mode::Node => Snapshot::capture_node(source).await?,
    };
    Ok(snapshot)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match usage_error(&e) {
            None => e.exit(),
            Some(err) => {
                let _ = e.print();
                println!("{}", render_error(&err));
                std::process::exit(Severity::Unknown.exit_code());
            }
        },
    };

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{e:#}");
    }

    let code = match execute(&cli).await {
        Ok(report) => {
            let color = std::io::stdout().is_terminal();
            match report.render(cli.output, color) {
                Ok(text) => {
                    println!("{}", text.trim_end());
                    report.exit_code()
                }
                Err(err) => fail(&err),
            }
        }
        Err(err) => fail(&err),
    };

    std::process::exit(code);
}

fn fail(err: &CheckError) -> i32 {
    match err.failure_class() {
        Some(class) => error!(error = %err, %class, "Check failed"),
        None => warn!(error = %err, "Check aborted"),
    }
    println!("{}", render_error(err));
    err.severity().exit_code()
}
