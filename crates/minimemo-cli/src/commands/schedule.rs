use chrono::Utc;
use minimemo_core::{NewSchedule, Schedule};

use crate::cli::ScheduleCommands;
use crate::commands::common::{
    format_schedule_lines, open_store, parse_when, require_confirmation, resolve_by_prefix,
    schedule_to_list_item, AppContext, ScheduleListItem,
};
use crate::error::CliError;

/// Field changes requested by `schedule edit`.
#[derive(Debug, Default)]
pub struct ScheduleChanges {
    pub title: Option<String>,
    pub at: Option<String>,
    pub clear_date: bool,
    pub link: Option<String>,
    pub notes: Option<String>,
}

pub fn run_schedule(ctx: &AppContext, command: ScheduleCommands) -> Result<(), CliError> {
    match command {
        ScheduleCommands::Add {
            title,
            at,
            link,
            notes,
        } => run_schedule_add(ctx, &title, at.as_deref(), link, notes),
        ScheduleCommands::List { pending, json } => run_schedule_list(ctx, pending, json),
        ScheduleCommands::Edit {
            id,
            title,
            at,
            clear_date,
            link,
            notes,
        } => run_schedule_edit(
            ctx,
            &id,
            ScheduleChanges {
                title,
                at,
                clear_date,
                link,
                notes,
            },
        ),
        ScheduleCommands::Delete { id } => run_schedule_delete(ctx, &id),
        ScheduleCommands::Reset { yes } => {
            require_confirmation(yes, "delete every schedule")?;
            let mut store = open_store(ctx)?;
            store.reset_schedules()?;
            store.shutdown();
            println!("All schedules deleted");
            Ok(())
        }
    }
}

fn normalize_title(title: &str) -> Result<String, CliError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyTitle)
    } else {
        Ok(trimmed.to_string())
    }
}

fn run_schedule_add(
    ctx: &AppContext,
    title: &str,
    at: Option<&str>,
    link: Option<String>,
    notes: Option<String>,
) -> Result<(), CliError> {
    let mut new = NewSchedule::new(normalize_title(title)?);
    new.date = at.map(|at| parse_when(at, Utc::now())).transpose()?;
    new.meet_link = link;
    new.notes = notes;

    let mut store = open_store(ctx)?;
    let schedule = store.add_schedule(new)?;
    let armed = store.scheduler().is_pending(&schedule.id);
    store.shutdown();

    println!("{}", schedule.id);
    if armed {
        tracing::info!("Meeting link will open at the start time while `minimemo watch` runs");
    }
    Ok(())
}

fn run_schedule_list(ctx: &AppContext, only_pending: bool, as_json: bool) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let pending = store.pending_timers();
    let mut schedules = store.schedules();
    store.shutdown();

    if only_pending {
        schedules.retain(|schedule| pending.iter().any(|timer| timer.schedule_id == schedule.id));
    }

    if as_json {
        let json_items = schedules
            .iter()
            .map(|schedule| schedule_to_list_item(schedule, &pending))
            .collect::<Vec<ScheduleListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if schedules.is_empty() {
        println!("No schedules.");
    } else {
        for line in format_schedule_lines(&schedules, &pending, Utc::now()) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Apply `changes` on top of `schedule`. Empty link or notes clear the field.
pub fn apply_changes(mut schedule: Schedule, changes: ScheduleChanges) -> Result<Schedule, CliError> {
    if let Some(title) = changes.title {
        schedule.title = normalize_title(&title)?;
    }
    if changes.clear_date {
        schedule.date = None;
    } else if let Some(at) = changes.at {
        schedule.date = Some(parse_when(&at, Utc::now())?);
    }
    if let Some(link) = changes.link {
        schedule.meet_link = Some(link);
    }
    if let Some(notes) = changes.notes {
        schedule.notes = Some(notes);
    }
    Ok(schedule)
}

fn run_schedule_edit(ctx: &AppContext, id: &str, changes: ScheduleChanges) -> Result<(), CliError> {
    let mut store = open_store(ctx)?;
    let schedules = store.schedules();
    let existing = resolve_schedule(&schedules, id)?.clone();
    let id = existing.id;

    let updated = apply_changes(existing, changes)?;
    store
        .update_schedule(updated)?
        .ok_or_else(|| CliError::NotFound {
            kind: "Schedule",
            query: id.to_string(),
        })?;
    store.shutdown();

    println!("{id}");
    Ok(())
}

fn run_schedule_delete(ctx: &AppContext, id: &str) -> Result<(), CliError> {
    let mut store = open_store(ctx)?;
    let schedules = store.schedules();
    let schedule = resolve_schedule(&schedules, id)?;

    store.delete_schedule(&schedule.id)?;
    store.shutdown();

    println!("{}", schedule.id);
    Ok(())
}

pub fn resolve_schedule<'a>(schedules: &'a [Schedule], query: &str) -> Result<&'a Schedule, CliError> {
    resolve_by_prefix(query, schedules, |schedule| schedule.id.to_string(), "Schedule")
}
