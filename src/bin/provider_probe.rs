//! provider-probe: 供应商健康探测与模型列表命令行工具
//!
//! Usage:
//!   provider-probe check <app> <provider>... [--config <path>]   Probe providers
//!   provider-probe check-all <app> [--config <path>]             Probe every provider of an app
//!   provider-probe models <app> <provider> [--config <path>]     List remote models
//!   provider-probe suggest <app> <provider> <query>              Rank remote models against a query

use anyhow::{anyhow, bail, Context};
use futures::future::join_all;
use provider_probe::config::ProbeSettings;
use provider_probe::models::fetch_models;
use provider_probe::notify::{Notification, Notifier};
use provider_probe::probe::{AppId, HttpProbeClient, ProbeOrchestrator};
use provider_probe::resilience::{CircuitBreakerConfig, CircuitBreakerRegistry};
use provider_probe::suggest::{highlight, rank, EnUsCollator};
use provider_probe::transport::HttpTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEFAULT_CONFIG: &str = "providers.yaml";
/// Notifications already reach stdout, so the log stays quiet by default.
const DEFAULT_LOG_FILTER: &str = "warn";

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "check" => run(cmd_check(&args[2..])),
        "check-all" => run(cmd_check_all(&args[2..])),
        "models" => run(cmd_models(&args[2..])),
        "suggest" => run(cmd_suggest(&args[2..])),
        "version" | "--version" | "-V" => {
            println!("provider-probe {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(true)
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"provider-probe: 供应商健康探测

USAGE:
    provider-probe <COMMAND> [OPTIONS]

COMMANDS:
    check <app> <provider>...         Probe the given providers concurrently
    check-all <app>                   Probe every provider configured for <app>
    models <app> <provider>           List models exposed by a provider
    suggest <app> <provider> <query>  Rank a provider's models against <query>
    version                           Show version information
    help                              Show this help message

OPTIONS:
    --config <path>                   Settings file (default: providers.yaml)

ENVIRONMENT:
    PROVIDER_PROBE_CONFIG             Settings file path
    PROVIDER_PROBE_TIMEOUT_SECS       Probe timeout, clamped to 5..=120
    PROVIDER_PROBE_DEGRADED_MS        Degraded threshold in milliseconds
    PROVIDER_PROBE_LOCALE             en | zh-CN
    RUST_LOG                          Log filter (default: warn)"#
    );
}

fn run(fut: impl std::future::Future<Output = anyhow::Result<bool>>) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(fut)
}

/// Prints notifications the way a toast would show them.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        println!("[{}] {}", n.level, n.message);
        if let Some(desc) = n.description {
            println!("         {}", desc);
        }
    }
}

/// Split `--config <path>` out of the positional arguments.
fn split_args(args: &[String]) -> anyhow::Result<(Vec<String>, PathBuf)> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let path = iter.next().ok_or_else(|| anyhow!("--config needs a path"))?;
            config = Some(PathBuf::from(path));
        } else {
            positional.push(arg.clone());
        }
    }
    let config = config
        .or_else(|| std::env::var("PROVIDER_PROBE_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    Ok((positional, config))
}

fn load_settings(path: &Path) -> anyhow::Result<Arc<ProbeSettings>> {
    let settings = ProbeSettings::load(path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    Ok(Arc::new(settings))
}

async fn cmd_check(args: &[String]) -> anyhow::Result<bool> {
    let (positional, config) = split_args(args)?;
    let Some((app, providers)) = positional.split_first() else {
        bail!("usage: provider-probe check <app> <provider>...");
    };
    if providers.is_empty() {
        bail!("usage: provider-probe check <app> <provider>...");
    }
    let settings = load_settings(&config)?;
    probe_all(settings, AppId::new(app.as_str()), providers.to_vec()).await
}

async fn cmd_check_all(args: &[String]) -> anyhow::Result<bool> {
    let (positional, config) = split_args(args)?;
    let [app] = positional.as_slice() else {
        bail!("usage: provider-probe check-all <app>");
    };
    let settings = load_settings(&config)?;
    let app = AppId::new(app.as_str());
    let providers: Vec<String> = settings.providers(&app).iter().map(|p| p.id.clone()).collect();
    if providers.is_empty() {
        bail!("no providers configured for app '{}'", app);
    }
    probe_all(settings, app, providers).await
}

async fn probe_all(
    settings: Arc<ProbeSettings>,
    app: AppId,
    provider_ids: Vec<String>,
) -> anyhow::Result<bool> {
    let client = HttpProbeClient::new(settings.clone())?;
    let orchestrator = ProbeOrchestrator::new(
        app.clone(),
        Arc::new(client),
        Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::from_env())),
        Arc::new(ConsoleNotifier),
    )
    .with_locale(settings.probe.locale);

    let probes = provider_ids.iter().map(|id| {
        let name = settings
            .provider(&app, id)
            .map(|p| p.display_name().to_string())
            .unwrap_or_else(|| id.clone());
        let orchestrator = &orchestrator;
        async move { orchestrator.begin_probe(id, &name).await }
    });
    let results = join_all(probes).await;

    let healthy = results
        .iter()
        .filter(|r| r.as_ref().map(|r| r.response_time_ms().is_some()).unwrap_or(false))
        .count();
    println!("\n=== Summary: {} reachable, {} failed ===", healthy, results.len() - healthy);
    Ok(healthy == results.len())
}

async fn fetch_ids(args: &[String], usage: &str) -> anyhow::Result<(Vec<String>, Vec<String>)> {
    let (positional, config) = split_args(args)?;
    if positional.len() < 2 {
        bail!("usage: {}", usage);
    }
    let settings = load_settings(&config)?;
    let app = AppId::new(positional[0].as_str());
    let provider = settings
        .provider(&app, &positional[1])
        .ok_or_else(|| anyhow!("unknown provider '{}' for app '{}'", positional[1], app))?;
    let api_key = HttpTransport::resolve_api_key(provider)
        .ok_or_else(|| anyhow!("no API key for provider '{}'", provider.id))?;

    let transport = HttpTransport::new(&settings.probe)?;
    let response = fetch_models(
        transport.client(),
        &provider.base_url,
        &api_key,
        transport.timeout(),
    )
    .await?;
    for warning in &response.warnings {
        eprintln!("warning: {}", warning);
    }
    eprintln!(
        "{} models from {} in {}ms",
        response.models.len(),
        response.resolved_url,
        response.elapsed_ms
    );
    Ok((positional[2..].to_vec(), response.ids()))
}

async fn cmd_models(args: &[String]) -> anyhow::Result<bool> {
    let (_, ids) = fetch_ids(args, "provider-probe models <app> <provider>").await?;
    for id in ids {
        println!("{}", id);
    }
    Ok(true)
}

async fn cmd_suggest(args: &[String]) -> anyhow::Result<bool> {
    let usage = "provider-probe suggest <app> <provider> <query>";
    let (rest, ids) = fetch_ids(args, usage).await?;
    let query = rest.join(" ");
    for candidate in rank(&ids, &query, &EnUsCollator) {
        let shown = match highlight(&candidate.value, &query) {
            Some(r) => format!(
                "{}[{}]{}",
                &candidate.value[..r.start],
                &candidate.value[r.clone()],
                &candidate.value[r.end..]
            ),
            None => candidate.value.clone(),
        };
        println!("{} {}", candidate.score, shown);
    }
    Ok(true)
}
