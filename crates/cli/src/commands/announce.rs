//! `announce` command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::{Notifier, Outcome, ServiceConfig, TransportKind};
use dispatcher::{create_mail_notifier, CancellationToken, DispatchConfig, Dispatcher};
use observability::DispatchStatsAggregator;
use registry::{announce_course_results, Announcement, RecordStore};

use crate::cli::AnnounceArgs;
use crate::commands::plan::{print_plan, PlanOutput};
use crate::error::CliError;

/// Execute the `announce` command
pub async fn run_announce(args: &AnnounceArgs) -> Result<()> {
    let config = load_config(args)?;

    if !args.roster.exists() {
        return Err(CliError::roster_not_found(args.roster.display().to_string()).into());
    }
    let store = RecordStore::from_roster_path(&args.roster)
        .with_context(|| format!("Failed to load roster from {}", args.roster.display()))?;

    let dispatcher = Dispatcher::new(DispatchConfig::from(&config.dispatch))
        .context("Invalid dispatch configuration")?;

    if args.dry_run {
        let course = store.get_course(args.course_id)?;
        let students = store.course_students(args.course_id)?;
        info!(course = %course, "Dry run mode - nothing will be sent");
        print_plan(&PlanOutput::new(dispatcher.planner(), students.len()));
        return Ok(());
    }

    if let Some(port) = config.observability.metrics_port {
        observability::init_metrics_only(port)?;
    }

    let notifier = Arc::new(
        create_mail_notifier(&config.mailer).context("Failed to create mail notifier")?,
    );
    let notifier_name = notifier.name().to_string();

    let cancel = CancellationToken::new();
    // Stops the watcher once the announcement is over
    let _watcher_guard = cancel.clone().drop_guard();
    tokio::spawn(cancel_on_shutdown(
        cancel.clone(),
        config.dispatch.timeout_ms.map(Duration::from_millis),
    ));

    info!(
        course_id = args.course_id,
        notifier = %notifier_name,
        max_batch_size = config.dispatch.max_batch_size,
        "Starting announcement..."
    );

    let announcement =
        announce_course_results(&store, args.course_id, &dispatcher, notifier, &cancel)
            .await
            .context("Announcement failed")?;

    let elapsed_ms = announcement.elapsed.as_secs_f64() * 1000.0;
    observability::record_dispatch_metrics(&notifier_name, &announcement.summary, elapsed_ms);
    for entry in &announcement.results {
        observability::record_outcome(&notifier_name, &entry.outcome);
    }
    let stats = announcement_stats(&announcement);

    if args.json {
        let json = serde_json::to_string_pretty(&announcement)
            .context("Failed to serialize announcement")?;
        println!("{}", json);
    } else {
        print_announcement(&announcement, &stats);
    }

    if announcement.summary.all_sent() {
        Ok(())
    } else {
        Err(CliError::partial_delivery(&announcement.summary).into())
    }
}

/// Load the configuration file (or defaults) and apply CLI overrides
fn load_config(args: &AnnounceArgs) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()).into());
            }
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            ServiceConfig::default()
        }
    };

    apply_overrides(&mut config, args);
    ConfigLoader::validate(&config).context("Invalid configuration after CLI overrides")?;
    Ok(config)
}

fn apply_overrides(config: &mut ServiceConfig, args: &AnnounceArgs) {
    if let Some(size) = args.batch_size {
        info!(max_batch_size = size, "Overriding batch size from CLI");
        config.dispatch.max_batch_size = size;
    }
    if let Some(limit) = args.max_workers {
        info!(max_concurrent_workers = limit, "Overriding worker limit from CLI");
        config.dispatch.max_concurrent_workers = Some(limit);
    }
    if let Some(timeout_ms) = args.timeout_ms {
        info!(timeout_ms, "Overriding timeout from CLI");
        config.dispatch.timeout_ms = Some(timeout_ms);
    }
    if let Some(ref sender) = args.sender {
        info!(sender = %sender, "Overriding sender from CLI");
        config.mailer.sender = sender.clone();
    }
    if let Some(ref dir) = args.spool_dir {
        info!(spool_dir = %dir.display(), "Spooling messages from CLI");
        config.mailer.transport = TransportKind::Spool;
        config.mailer.spool_dir = Some(dir.clone());
    }
}

/// Fire `cancel` on Ctrl+C, SIGTERM or when the timeout elapses
async fn cancel_on_shutdown(cancel: CancellationToken, timeout: Option<Duration>) {
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        _ = shutdown_signal() => {
            warn!("Received shutdown signal, cancelling remaining notifications...");
        }
        _ = deadline => {
            warn!(timeout = ?timeout, "Announcement timed out, cancelling remaining notifications...");
        }
    }
    cancel.cancel();
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn announcement_stats(announcement: &Announcement) -> DispatchStatsAggregator {
    let mut stats = DispatchStatsAggregator::new();
    stats.update(
        &announcement.summary,
        announcement.elapsed.as_secs_f64() * 1000.0,
    );
    stats
}

fn print_announcement(announcement: &Announcement, stats: &DispatchStatsAggregator) {
    println!("\n=== {} ===\n", announcement.course);

    for entry in &announcement.results {
        match &entry.outcome {
            Outcome::Sent => println!("  ✓ {}", entry.email),
            Outcome::Failed { reason } => println!("  ✗ {}: {}", entry.email, reason),
        }
    }

    println!("\nWorkers: {}", announcement.summary.workers);
    println!("{}", stats);
}
