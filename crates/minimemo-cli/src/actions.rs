//! Opening meeting links and announcing them on the terminal.

use std::process::{Command, Stdio};

use chrono::Local;
use minimemo_core::actions::ActionSink;

#[derive(Debug, Clone, Default)]
pub struct SystemActions {
    open_command: Option<String>,
}

impl SystemActions {
    pub const fn new(open_command: Option<String>) -> Self {
        Self { open_command }
    }
}

/// Program and arguments that open `url`, honouring a configured command.
pub fn opener_args(open_command: Option<&str>, url: &str) -> Vec<String> {
    let mut args = open_command
        .map(|command| {
            command
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|parts| !parts.is_empty())
        .unwrap_or_else(platform_opener);
    args.push(url.to_string());
    args
}

fn platform_opener() -> Vec<String> {
    let parts: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else if cfg!(windows) {
        &["cmd", "/C", "start", ""]
    } else {
        &["xdg-open"]
    };
    parts.iter().map(|part| (*part).to_string()).collect()
}

impl ActionSink for SystemActions {
    fn open_url(&self, url: &str) {
        let args = opener_args(self.open_command.as_deref(), url);
        let Some((program, rest)) = args.split_first() else {
            return;
        };

        let spawned = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(_) => tracing::info!("Opened {} with {}", url, program),
            Err(error) => tracing::warn!("Failed to open {} with {}: {}", url, program, error),
        }
    }

    fn notify(&self, title: &str, body: &str) {
        println!("[{}] {title}  {body}", Local::now().format("%H:%M"));
    }
}
