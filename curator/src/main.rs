//! Main entry point for the curator binary
//!
//! Loads configuration, wires the real services into the orchestrator and
//! hands it to the scheduler until Ctrl+C or SIGTERM.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tokio::sync::mpsc;

use curator::services::{RealFeedSource, RealSocialClient, RealStateStore, RealTranslator};
use curator::{
    AccountMirrorTracker, CuratorConfig, CuratorResult, CycleOrchestrator, DomainTrustFilter, NewsChangeTracker,
    Scheduler, TokioSleeper,
};
use shared::{component_debug, component_info, logging, Component};

/// Posts translated crypto headlines and mirrors a monitored account
#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Curates trusted crypto news and mirrors a monitored account")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Directory holding the news and mirror records (overrides STATE_DIR)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Trusted domains JSON file (overrides TRUSTED_DOMAINS_FILE)
    #[arg(long)]
    pub domains_file: Option<PathBuf>,

    /// Seconds between cycles (overrides POLL_INTERVAL_SECS)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Stop after this many cycles (runs indefinitely if not specified)
    #[arg(long)]
    pub cycles: Option<u64>,
}

impl Args {
    /// Command line overrides keyed by the environment variable they replace
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(dir) = &self.state_dir {
            overrides.insert("STATE_DIR".to_string(), dir.display().to_string());
        }
        if let Some(path) = &self.domains_file {
            overrides.insert("TRUSTED_DOMAINS_FILE".to_string(), path.display().to_string());
        }
        if let Some(secs) = self.interval_secs {
            overrides.insert("POLL_INTERVAL_SECS".to_string(), secs.to_string());
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(Some(&args.log_level));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::log_error(Component::Scheduler, "Startup", &e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> CuratorResult<()> {
    let config = CuratorConfig::from_env_with_overrides(&args.overrides())?;

    logging::log_startup(Component::Scheduler, "curator agent");
    component_debug!(
        Component::Scheduler,
        "Interval: {}s, state: {}, trusted domains: {}, cycles: {}",
        config.poll_interval.as_secs(),
        config.state_dir.display(),
        config.trusted_domains.len(),
        args.cycles
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unlimited".to_string())
    );

    // Initialize services
    let feed = RealFeedSource::new(&config.news_api_url, &config.news_api_key, config.http_timeout)?;
    let translator = RealTranslator::new(&config.translate_api_url, config.http_timeout)?;
    let social = RealSocialClient::new(&config.twitter_api_url, config.credentials.clone(), config.http_timeout)?;
    let store = RealStateStore::open(&config.state_dir).await?;

    let news = NewsChangeTracker::new(feed, DomainTrustFilter::new(config.trusted_domains.clone()));
    let mirror = match &config.monitored_account {
        Some(account) => {
            component_info!(Component::Mirror, "👀 Mirroring account @{}", account);
            Some(AccountMirrorTracker::new(social.clone(), account.clone()))
        }
        None => {
            component_info!(Component::Mirror, "⚠️ TWITTER_MONITORED_ACCOUNT not set, mirroring disabled");
            None
        }
    };

    // Create orchestrator with dependency injection
    let orchestrator = CycleOrchestrator::new(
        news,
        mirror,
        translator,
        social.clone(),
        store,
        social,
        config.cycle_settings(),
    );

    let mut scheduler =
        Scheduler::new(orchestrator, TokioSleeper, config.poll_interval).with_max_cycles(args.cycles);

    // Set up graceful shutdown
    spawn_signal_listener(scheduler.get_shutdown_sender());

    let report = scheduler.run().await;
    logging::log_success(
        Component::Scheduler,
        &format!(
            "Curator stopped gracefully after {} cycles ({} aborted)",
            report.cycles, report.aborted_cycles
        ),
    );
    Ok(())
}

fn spawn_signal_listener(shutdown_sender: mpsc::Sender<()>) {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => {
                logging::log_shutdown(Component::Scheduler, &format!("Received {name} signal"));
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(Component::Scheduler, "Signal handling", &err);
            }
        }
    });
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
    tokio::select! {
        result = signal::ctrl_c() => result.map(|()| "Ctrl+C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    signal::ctrl_c().await.map(|()| "Ctrl+C")
}
