use serde::Serialize;

use crate::cli::{ConfigCommands, ConfigKey};
use crate::commands::common::AppContext;
use crate::config::{default_config_path, CliConfig};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub config_path: String,
    pub data_dir: String,
    pub calendar_feed: Option<String>,
    pub calendar_token: Option<&'static str>,
    pub notify_on_fire: bool,
    pub open_command: Option<String>,
}

pub fn config_view(ctx: &AppContext, config_path: &str) -> ConfigView {
    ConfigView {
        config_path: config_path.to_string(),
        data_dir: ctx.data_dir.display().to_string(),
        calendar_feed: ctx.config.calendar_feed.clone(),
        calendar_token: ctx.config.calendar_token.as_ref().map(|_| "[REDACTED]"),
        notify_on_fire: ctx.config.notify_on_fire,
        open_command: ctx.config.open_command.clone(),
    }
}

pub fn run_config(ctx: &AppContext, command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { json } => {
            let path = default_config_path().map_err(CliError::Config)?;
            let view = config_view(ctx, &path.display().to_string());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("config:          {}", view.config_path);
                println!("data dir:        {}", view.data_dir);
                println!(
                    "calendar feed:   {}",
                    view.calendar_feed.as_deref().unwrap_or("(demo calendar)")
                );
                println!(
                    "calendar token:  {}",
                    view.calendar_token.unwrap_or("(not set)")
                );
                println!("notify on fire:  {}", view.notify_on_fire);
                println!(
                    "open command:    {}",
                    view.open_command.as_deref().unwrap_or("(platform default)")
                );
            }
            Ok(())
        }
        ConfigCommands::Set { key, value } => run_config_set(key, &value),
    }
}

fn run_config_set(key: ConfigKey, value: &str) -> Result<(), CliError> {
    let mut config = CliConfig::load().map_err(CliError::Config)?;
    config.set(key, value).map_err(CliError::Config)?;
    let path = config.save().map_err(CliError::Config)?;
    println!("Saved {}", path.display());
    Ok(())
}
