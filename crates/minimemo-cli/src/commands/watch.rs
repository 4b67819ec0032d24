use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use minimemo_core::Error as CoreError;
use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

use crate::commands::common::{format_schedule_lines, open_store, AppContext, CliStore};
use crate::commands::sync::{build_orchestrator, describe_report};
use crate::error::CliError;

/// How often the data directory is re-read for edits made by other invocations.
pub const RELOAD_EVERY: Duration = Duration::from_secs(5);

pub async fn run_watch(ctx: &AppContext, sync_every: Option<u64>) -> Result<(), CliError> {
    let store = open_store(ctx)?;

    let pending = store.pending_timers();
    if pending.is_empty() {
        println!("No upcoming meeting links.");
    } else {
        let schedules = store
            .schedules()
            .into_iter()
            .filter(|schedule| pending.iter().any(|timer| timer.schedule_id == schedule.id))
            .collect::<Vec<_>>();
        for line in format_schedule_lines(&schedules, &pending, Utc::now()) {
            println!("{line}");
        }
    }

    let store = Arc::new(Mutex::new(store));
    println!("Watching for meetings. Press Ctrl-C to stop.");

    let mut reload = ticker(RELOAD_EVERY);
    // The first tick completes immediately; the store was just loaded.
    reload.tick().await;
    let mut sync = sync_every.map(|seconds| ticker(Duration::from_secs(seconds)));

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            _ = reload.tick() => {
                reload_store(&store).await;
            }
            () = next_tick(sync.as_mut()) => sync_calendar(ctx, &store).await,
        }
    }

    store.lock().await.shutdown();
    println!("Stopped watching");
    Ok(())
}

fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Re-read the data directory. Returns whether the schedule list changed.
pub async fn reload_store(store: &Arc<Mutex<CliStore>>) -> bool {
    let changed = store.lock().await.reload();
    if changed {
        tracing::debug!("Schedules changed on disk; timers rebuilt");
    }
    changed
}

/// Pull the calendar with whatever credential is stored right now.
async fn sync_calendar(ctx: &AppContext, store: &Arc<Mutex<CliStore>>) {
    reload_store(store).await;
    let token = store.lock().await.auth_token();

    let orchestrator = match build_orchestrator(ctx, store.clone(), token) {
        Ok(orchestrator) => orchestrator,
        Err(error) => {
            tracing::warn!("Calendar unavailable: {}", error);
            return;
        }
    };

    match orchestrator.sync().await {
        Ok(report) => tracing::info!("{}", describe_report(&report)),
        Err(CoreError::AuthRequired) => tracing::debug!("Calendar not connected; skipping sync"),
        Err(error) => tracing::warn!("Calendar sync failed: {}", error),
    }
}
