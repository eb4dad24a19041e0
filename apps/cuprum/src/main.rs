use clap::{Parser, ValueEnum};
use cuprum::headless::{run_headless, HeadlessMode};
use cuprum::{build_source, logging, DashboardOpts};
use cuprum_application::acquisition::fetch_and_clean;
use cuprum_application::config::{resolve_config, Config};
use cuprum_application::presentation::build_presentation;
use cuprum_application::training::train_and_evaluate;
use cuprum_domain::repositories::price_source::PriceTableSource;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cuprum")]
#[command(about = "LME copper price model + terminal dashboard.", version)]
struct Cli {
    /// Run without the dashboard and exit after the selected mode completes.
    #[arg(long)]
    headless: bool,

    /// Headless mode: train | table | validate
    #[arg(long)]
    mode: Option<Mode>,

    /// Config file path (TOML). If omitted, uses env CUPRUM_CONFIG, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read a saved copy of the price page instead of fetching it.
    #[arg(long)]
    source_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Mode {
    Train,
    Table,
    Validate,
}

fn main() {
    let cli = Cli::parse();

    let log_store = logging::LogStore::shared(5000);
    let traced = if cli.headless {
        init_tracing_stderr()
    } else {
        init_tracing(log_store.clone())
    };
    if let Err(err) = traced {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
    if let Err(err) = init_metrics() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let config_path = cli.config.or_else(|| {
        std::env::var("CUPRUM_CONFIG")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    });
    let config = match resolve_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let source = match build_source(&config, cli.source_file.as_deref()) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    if cli.headless {
        let Some(mode) = cli.mode else {
            eprintln!("error: --mode is required with --headless");
            std::process::exit(1);
        };
        let mode = match mode {
            Mode::Train => HeadlessMode::Train,
            Mode::Table => HeadlessMode::Table,
            Mode::Validate => HeadlessMode::Validate,
        };

        match run_headless(mode, &config, source.as_ref()) {
            Ok(output) => {
                print!("{output}");
                if !output.ends_with('\n') {
                    println!();
                }
                std::process::exit(0);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        }
    }

    let opts = match prepare_dashboard(&config, source.as_ref(), log_store) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = cuprum::run(opts) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Fetch, train and print the score before the dashboard takes over the screen.
fn prepare_dashboard(
    config: &Config,
    source: &dyn PriceTableSource,
    log_store: logging::SharedLogStore,
) -> Result<DashboardOpts, String> {
    let table = fetch_and_clean(source)?;
    let outcome = train_and_evaluate(&table, &config.model)?;
    println!("{}", cuprum::headless::format_score(outcome.sqrt_r2));

    Ok(DashboardOpts {
        presentation: build_presentation(&table, &config.dashboard),
        outcome: Some(outcome),
        log_store,
    })
}

fn env_filter() -> Result<tracing_subscriber::EnvFilter, String> {
    let filter = std::env::var("CUPRUM_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::EnvFilter::try_new(filter)
        .map_err(|err| format!("invalid log filter: {err}"))
}

fn init_tracing(log_store: logging::SharedLogStore) -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(logging::LogMakeWriter::new(log_store))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Headless modes keep stdout for the result.
fn init_tracing_stderr() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let Some(raw) = std::env::var("CUPRUM_METRICS_ADDR").ok() else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let addr: SocketAddr = raw
        .parse()
        .map_err(|err| format!("invalid CUPRUM_METRICS_ADDR (expected host:port): {err}"))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|err| format!("failed to install prometheus exporter: {err}"))?;

    tracing::info!(metrics_addr = %addr, "prometheus metrics exporter enabled");
    Ok(Some(addr))
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics() -> Result<Option<SocketAddr>, String> {
    Ok(None)
}
