use std::sync::Arc;

use minimemo_core::{Error as CoreError, SyncOrchestrator, SyncReport};
use tokio::sync::Mutex;

use crate::calendar::CliCalendar;
use crate::commands::common::{open_store, AppContext, CliPersistence, CliStore};
use crate::error::CliError;

pub type CliSync = SyncOrchestrator<CliPersistence, CliCalendar>;

/// Wire a shared store to the configured calendar.
pub fn build_orchestrator(
    ctx: &AppContext,
    store: Arc<Mutex<CliStore>>,
    stored_token: Option<String>,
) -> Result<CliSync, CliError> {
    let calendar = CliCalendar::from_config(&ctx.config, stored_token)?;
    tracing::debug!("Using {}", calendar.describe());
    Ok(SyncOrchestrator::new(store, Arc::new(calendar)))
}

pub fn map_sync_error(error: CoreError) -> CliError {
    match error {
        CoreError::AuthRequired => CliError::NotAuthenticated,
        other => CliError::Core(other),
    }
}

pub fn describe_report(report: &SyncReport) -> String {
    format!(
        "Synced {} calendar events ({} local kept, {} replaced); {} meeting links armed",
        report.fetched, report.merge.kept_local, report.merge.dropped_remote, report.pending_timers
    )
}

pub async fn run_sync(ctx: &AppContext) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let token = store.auth_token();
    let store = Arc::new(Mutex::new(store));
    let orchestrator = build_orchestrator(ctx, store.clone(), token)?;

    let result = orchestrator.sync().await;
    store.lock().await.shutdown();

    let report = result.map_err(map_sync_error)?;
    println!("{}", describe_report(&report));
    Ok(())
}
