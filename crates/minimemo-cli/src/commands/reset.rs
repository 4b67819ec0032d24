use crate::commands::common::{open_store, require_confirmation, AppContext};
use crate::error::CliError;

pub fn run_reset(ctx: &AppContext, yes: bool) -> Result<(), CliError> {
    require_confirmation(yes, "delete every note and schedule")?;

    let mut store = open_store(ctx)?;
    store.reset_all()?;
    store.shutdown();

    println!("All notes and schedules deleted");
    Ok(())
}
