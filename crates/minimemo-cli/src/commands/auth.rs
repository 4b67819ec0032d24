use minimemo_core::calendar::DemoCalendar;
use minimemo_core::util::non_blank_owned;

use crate::calendar::CliCalendar;
use crate::cli::AuthCommands;
use crate::commands::common::{open_store, AppContext};
use crate::error::CliError;

pub fn run_auth(ctx: &AppContext, command: AuthCommands) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { token } => {
            let token = match non_blank_owned(token) {
                Some(token) => token,
                None if ctx.config.calendar_feed.is_some() => return Err(CliError::MissingToken),
                None => DemoCalendar::DEMO_TOKEN.to_string(),
            };

            let mut store = open_store(ctx)?;
            store.set_auth_token(Some(&token))?;
            store.shutdown();

            let calendar = CliCalendar::from_config(&ctx.config, None)?;
            println!("Connected {}. Run `minimemo sync` to fetch events.", calendar.describe());
            Ok(())
        }
        AuthCommands::Status => {
            let store = open_store(ctx)?;
            let connected = store.is_authenticated();
            let remote_count = store
                .schedules()
                .iter()
                .filter(|schedule| schedule.is_remote())
                .count();
            store.shutdown();

            let calendar = CliCalendar::from_config(&ctx.config, None)?;
            if connected {
                println!(
                    "Connected to {} ({} calendar schedules stored)",
                    calendar.describe(),
                    remote_count
                );
            } else {
                println!("Not connected ({} configured)", calendar.describe());
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let mut store = open_store(ctx)?;
            let removed = store.disconnect_remote()?;
            store.shutdown();
            println!("Disconnected calendar; removed {removed} calendar schedules");
            Ok(())
        }
    }
}
