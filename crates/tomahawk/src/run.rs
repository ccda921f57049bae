// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! `tomahawk run`: the account control loop.
//!
//! One thread does everything. The loop waits on four sources at once:
//! account signals, the earliest pending retry, settings file changes, and the
//! shutdown trigger. Each wake-up is handled to completion before the next.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::Instant;
use tomahawk_accounts::{AccountEvent, AccountManager, AccountRegistry};
use tomahawk_config::TomahawkConfig;
use tomahawk_core::{AccountSignalReceiver, TomahawkError};
use tracing::{info, warn};

use crate::setup::open_session;
use crate::watch::{SETTINGS_DEBOUNCE, SettingsWatcher};

/// Counters reported when the loop exits.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoopStats {
    pub signals: usize,
    pub retries: usize,
    pub reloads: usize,
}

/// Logs every account event.
struct LoggingObserver;

impl tomahawk_accounts::AccountObserver for LoggingObserver {
    fn on_event(&mut self, event: &AccountEvent, registry: &AccountRegistry) {
        match event {
            AccountEvent::AuthError(id, error) => {
                warn!(account_id = %id, error = %error, "account needs new credentials");
            }
            AccountEvent::StateChanged(id, state) => {
                info!(account_id = %id, state = %state, "account state changed");
            }
            other => {
                info!(
                    account_id = %other.account_id(),
                    event = other.name(),
                    accounts = registry.len(),
                    connected = registry.connected().len(),
                    "account event"
                );
            }
        }
    }
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Drive `manager` until `shutdown` resolves.
///
/// Time is read from tokio's clock so the loop behaves the same under a
/// paused test runtime.
pub async fn event_loop(
    manager: &mut AccountManager,
    signals: &mut AccountSignalReceiver,
    watcher: &mut SettingsWatcher,
    shutdown: impl Future<Output = ()>,
) -> LoopStats {
    let mut stats = LoopStats::default();
    tokio::pin!(shutdown);

    loop {
        let retry_at = manager.next_retry_deadline();
        tokio::select! {
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    warn!("account signal channel closed");
                    break;
                };
                manager.handle_signal_at(signal, Instant::now().into_std());
                stats.signals += 1;
            }
            _ = sleep_until(retry_at) => {
                stats.retries += manager.fire_due_retries(Instant::now().into_std()).len();
            }
            paths = watcher.changed() => {
                info!(files = ?paths, "settings changed, notifying connectivity plugins");
                manager.on_settings_changed();
                stats.reloads += 1;
            }
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
        }
    }
    stats
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

/// Run the `tomahawk run` command.
pub async fn run(
    config: &TomahawkConfig,
    watched: Vec<PathBuf>,
    stop_after: Option<Duration>,
) -> Result<(), TomahawkError> {
    info!("starting tomahawk account host");

    let mut session = open_session(config)?;
    let manager = &mut session.manager;
    manager.subscribe(LoggingObserver);

    let summary = manager.load_from_config();
    info!(
        factories = manager.factories().len(),
        accounts = summary.loaded.len(),
        skipped = summary.skipped(),
        "accounts ready"
    );
    manager.init_sip();
    manager.connect_all();

    let mut watcher = match SettingsWatcher::new(watched, SETTINGS_DEBOUNCE) {
        Ok(watcher) => watcher,
        Err(error) => {
            warn!(%error, "settings watcher unavailable, changes need a restart");
            SettingsWatcher::disabled()
        }
    };
    let shutdown = async move {
        match stop_after {
            Some(duration) => tokio::time::sleep(duration).await,
            None => ctrl_c().await,
        }
    };
    let stats = event_loop(manager, &mut session.signals, &mut watcher, shutdown).await;

    manager.shutdown();
    info!(
        signals = stats.signals,
        retries = stats.retries,
        reloads = stats.reloads,
        "tomahawk shutdown complete"
    );
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tomahawk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
