use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use minimemo_core::persistence::{FileBackend, KeyValuePersistence};
use minimemo_core::scheduler::{PendingTimer, SchedulerConfig};
use minimemo_core::{Note, Schedule, Store};
use serde::Serialize;

use crate::actions::SystemActions;
use crate::config::{CliConfig, DATA_DIR_ENV};
use crate::error::CliError;

pub type CliPersistence = KeyValuePersistence<FileBackend>;
pub type CliStore = Store<CliPersistence>;

/// Configuration and paths shared by every command.
pub struct AppContext {
    pub config: CliConfig,
    pub data_dir: PathBuf,
}

impl AppContext {
    pub fn load(cli_data_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let config = CliConfig::load().map_err(CliError::Config)?;
        let data_dir = config
            .resolve_data_dir(cli_data_dir, env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .map_err(CliError::Config)?;
        Ok(Self { config, data_dir })
    }

    #[cfg(test)]
    pub const fn new(config: CliConfig, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }
}

/// Open the file-backed store. Timers are armed for whatever is loaded.
pub fn open_store(ctx: &AppContext) -> Result<CliStore, CliError> {
    let persistence = KeyValuePersistence::open_dir(&ctx.data_dir)?;
    let actions = Arc::new(SystemActions::new(ctx.config.open_command.clone()));
    let config = SchedulerConfig::new(actions).notify_on_fire(ctx.config.notify_on_fire);
    Ok(Store::open(persistence, config))
}

pub fn require_confirmation(yes: bool, action: &'static str) -> Result<(), CliError> {
    if yes {
        Ok(())
    } else {
        Err(CliError::ConfirmationRequired(action))
    }
}

// ----------------------------------------------------------------------
// Id resolution
// ----------------------------------------------------------------------

pub fn normalize_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find the single item whose id equals or starts with `query`.
pub fn resolve_by_prefix<'a, T>(
    query: &str,
    items: &'a [T],
    id_of: impl Fn(&T) -> String,
    kind: &'static str,
) -> Result<&'a T, CliError> {
    let query = normalize_identifier(query)?;
    if let Some(exact) = items.iter().find(|item| id_of(item) == query) {
        return Ok(exact);
    }

    let matching = items
        .iter()
        .filter(|item| id_of(item).starts_with(&query))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::NotFound { kind, query }),
        [single] => Ok(single),
        several => {
            let options = several
                .iter()
                .take(3)
                .map(|item| short_id(&id_of(item)))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(13).collect()
}

// ----------------------------------------------------------------------
// Formatting
// ----------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub preview: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduleListItem {
    pub id: String,
    pub title: String,
    pub date: Option<DateTime<Utc>>,
    pub meet_link: Option<String>,
    pub notes: Option<String>,
    pub origin: &'static str,
    pub remote_id: Option<String>,
    pub timer_due_at: Option<DateTime<Utc>>,
}

pub fn format_note_lines(notes: &[Note], now: DateTime<Utc>) -> Vec<String> {
    notes
        .iter()
        .map(|note| {
            let short_id = short_id(&note.id.to_string());
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.modified_at, now);
            format!("{short_id:<13}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn note_to_list_item(note: &Note, now: DateTime<Utc>) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        preview: note_preview(note, 80),
        content: note.content.clone(),
        created_at: note.created_at,
        modified_at: note.modified_at,
        relative_time: format_relative_time(note.modified_at, now),
    }
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.content.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_schedule_lines(
    schedules: &[Schedule],
    pending: &[PendingTimer],
    now: DateTime<Utc>,
) -> Vec<String> {
    schedules
        .iter()
        .map(|schedule| {
            let short_id = short_id(&schedule.id.to_string());
            let when = schedule.date.map_or_else(
                || "(no date)".to_string(),
                |date| date.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
            );
            let mut line = format!("{short_id:<13}  {when:<16}  {}", schedule.title);
            if schedule.is_remote() {
                line.push_str("  [calendar]");
            }
            if let Some(timer) = pending
                .iter()
                .find(|timer| timer.schedule_id == schedule.id)
            {
                line.push_str(&format!(
                    "  opens link {}",
                    format_relative_time(timer.due_at, now)
                ));
            } else if let Some(link) = schedule.active_meet_link() {
                line.push_str(&format!("  {link}"));
            }
            line
        })
        .collect()
}

pub fn schedule_to_list_item(schedule: &Schedule, pending: &[PendingTimer]) -> ScheduleListItem {
    ScheduleListItem {
        id: schedule.id.to_string(),
        title: schedule.title.clone(),
        date: schedule.date,
        meet_link: schedule.meet_link.clone(),
        notes: schedule.notes.clone(),
        origin: if schedule.is_remote() { "remote" } else { "local" },
        remote_id: schedule.origin.remote_id().map(str::to_string),
        timer_due_at: pending
            .iter()
            .find(|timer| timer.schedule_id == schedule.id)
            .map(|timer| timer.due_at),
    }
}

/// "5m ago" for past instants, "in 5m" for future ones.
pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = now.signed_duration_since(at).num_milliseconds();
    let future = diff_ms < 0;
    let diff = diff_ms.saturating_abs();

    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        return if future { "in <1m" } else { "just now" }.to_string();
    }
    let amount = if diff < hour {
        format!("{}m", diff / minute)
    } else if diff < day {
        format!("{}h", diff / hour)
    } else if diff < week {
        format!("{}d", diff / day)
    } else if diff < month {
        format!("{}w", diff / week)
    } else if diff < year {
        format!("{}mo", diff / month)
    } else {
        format!("{}y", diff / year)
    };

    if future {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

// ----------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------

/// Parse a start time in local time.
pub fn parse_when(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CliError> {
    parse_when_in(input, now, &Local)
}

/// Parse RFC 3339, "YYYY-MM-DD HH:MM", "YYYY-MM-DD" (midnight), or a
/// relative offset such as "+45m", "+2h", "+1d". Naive forms are read in `tz`.
pub fn parse_when_in<Tz: TimeZone>(
    input: &str,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateTime<Utc>, CliError> {
    let trimmed = input.trim();
    let invalid = || CliError::InvalidTime(trimmed.to_string());

    if let Some(offset) = trimmed.strip_prefix('+') {
        return parse_offset(offset)
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or_else(invalid);
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date_time.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN))
        })
        .map_err(|_| invalid())?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|date_time| date_time.with_timezone(&Utc))
        .ok_or_else(invalid)
}

fn parse_offset(offset: &str) -> Option<Duration> {
    let unit_at = offset.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = offset.split_at(unit_at);
    let amount = amount.parse::<i64>().ok()?;
    match unit {
        "m" | "min" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }
}

// ----------------------------------------------------------------------
// Note content input
// ----------------------------------------------------------------------

pub fn resolve_note_content(content_parts: &[String]) -> Result<String, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(content);
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(content);
    }

    if let Some(content) = capture_editor_input()? {
        return Ok(content);
    }

    Err(CliError::EmptyContent)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("minimemo-note-{}-{now}.md", std::process::id()))
}
