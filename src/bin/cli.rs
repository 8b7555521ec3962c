use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use bulk_publish::prelude::*;
use bulk_publish::ConfigError;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

/// Conventional 128 + SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Parser)]
#[command(name = "bulk-publish")]
#[command(about = "Create, deploy and publish batches of APIs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision a batch of APIs through the full lifecycle
    Run {
        #[command(flatten)]
        settings: Settings,

        /// Write the final report as JSON to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Print the API names a batch would create, without contacting the server
    Plan {
        #[command(flatten)]
        settings: Settings,
    },

    /// Validate configuration and credentials without contacting the server
    Validate {
        #[command(flatten)]
        settings: Settings,
    },
}

#[derive(Args, Clone)]
struct Settings {
    /// Path to a YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Publisher API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Name prefix for generated APIs (overrides config)
    #[arg(short, long)]
    prefix: Option<String>,

    /// First index appended to the prefix (overrides config)
    #[arg(short, long)]
    start: Option<u64>,

    /// Number of APIs to provision (overrides config)
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Pause between APIs in milliseconds (overrides config)
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,

    /// Bearer token
    #[arg(long, env = "BULK_PUBLISH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Username for basic authentication
    #[arg(long, env = "BULK_PUBLISH_USERNAME")]
    username: Option<String>,

    /// Password for basic authentication
    #[arg(long, env = "BULK_PUBLISH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Skip TLS certificate validation (self-signed local servers only)
    #[arg(long)]
    insecure: bool,
}

impl Settings {
    fn load_file(&self) -> anyhow::Result<Option<ProvisionConfig>> {
        self.config
            .as_ref()
            .map(|path| {
                ProvisionConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))
            })
            .transpose()
    }

    fn apply_batch(&self, batch: &mut BatchConfig) {
        if let Some(prefix) = &self.prefix {
            batch.prefix = prefix.clone();
        }
        if let Some(start) = self.start {
            batch.start = start;
        }
        if let Some(count) = self.count {
            batch.count = count;
        }
        if let Some(pacing_ms) = self.pacing_ms {
            batch.pacing_ms = pacing_ms;
        }
    }

    /// Batch section only; needs neither a base URL nor credentials
    fn batch(&self) -> anyhow::Result<BatchConfig> {
        let mut batch = self.load_file()?.map(|c| c.batch).unwrap_or_default();
        self.apply_batch(&mut batch);
        Ok(batch)
    }

    fn resolve(&self) -> anyhow::Result<ProvisionConfig> {
        let mut config = match self.load_file()? {
            Some(config) => config,
            None => {
                let Some(base_url) = &self.base_url else {
                    bail!("--base-url is required when no --config file is given");
                };
                ProvisionConfig::from_base_url(base_url.clone())
            }
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        self.apply_batch(&mut config.batch);
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.insecure {
            config.validate_ssl = false;
        }

        match (&self.token, &self.username, &self.password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                bail!("--token cannot be combined with --username/--password (check BULK_PUBLISH_* variables)")
            }
            (Some(token), None, None) => config.auth = Some(AuthConfig::bearer(token.clone())),
            (None, Some(username), Some(password)) => {
                config.auth = Some(AuthConfig::basic(username.clone(), password.clone()))
            }
            (None, Some(_), None) => bail!("--username requires --password"),
            (None, None, Some(_)) => bail!("--password requires --username"),
            (None, None, None) => {}
        }

        Ok(config)
    }
}

/// Prints one line per finished API
struct ConsoleProgress;

impl BatchObserver for ConsoleProgress {
    fn on_outcome(&mut self, progress: Progress, outcome: &PipelineOutcome) {
        println!("{}", progress_line(progress, outcome));
    }

    fn on_stopped(&mut self, skipped: &[String]) {
        println!("Stopped: {} APIs not attempted", skipped.len());
    }
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "bulk_publish=debug"
    } else {
        "bulk_publish=info"
    };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("bulk-publish");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "bulk_publish=debug"
    } else {
        "bulk_publish=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Provisioning failed");
            eprintln!("❌ ERROR: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Run { settings, report } => run_batch(settings, report).await,
        Commands::Plan { settings } => plan(settings),
        Commands::Validate { settings } => validate(settings),
    }
}

#[tracing::instrument(skip_all)]
async fn run_batch(settings: Settings, report_path: Option<PathBuf>) -> anyhow::Result<bool> {
    let provisioner = Provisioner::from_config(settings.resolve()?)?;
    let names = provisioner.names()?;

    println!("{}", "=".repeat(60));
    println!("API Creation and Publishing Started");
    println!("Name Prefix: {}", names.prefix());
    println!("Start Number: {}", names.start());
    println!("Total Count: {}", names.len());
    println!("{}", "=".repeat(60));

    let stop = provisioner.stop_signal();
    start_interrupt_listener(stop);

    let report = provisioner.run(&mut ConsoleProgress).await?;

    println!("{}", report.render());

    if let Some(path) = report_path {
        std::fs::write(&path, report.to_json()?)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(!report.has_failures() && report.is_complete())
}

/// First Ctrl-C lets the API in flight finish, then stops the batch.
/// A second one exits immediately.
fn start_interrupt_listener(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("Interrupt received, stopping after the current API (Ctrl-C again to abort)");
        stop.store(true, Ordering::SeqCst);

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("❌ Aborted");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

fn plan(settings: Settings) -> anyhow::Result<bool> {
    let names = NameSequence::try_from(&settings.batch()?)?;

    println!("Planned APIs ({}):", names.len());
    for name in names.names() {
        println!("  {}", name);
    }
    Ok(true)
}

fn validate(settings: Settings) -> anyhow::Result<bool> {
    let config = settings.resolve()?;
    config.validate()?;

    let credential = config
        .auth
        .as_ref()
        .ok_or(ConfigError::MissingCredentials)?
        .obtain()?;

    println!("✓ Configuration is valid");
    println!("  Base URL: {}", config.base_url);
    println!("  Authorization: {}", credential.masked());
    println!(
        "  Batch: {} x {} starting at {}",
        config.batch.count, config.batch.prefix, config.batch.start
    );
    if !config.validate_ssl {
        println!("  ⚠ TLS certificate validation disabled");
    }
    Ok(true)
}
