use chrono::Utc;
use minimemo_core::Note;

use crate::cli::NoteCommands;
use crate::commands::common::{
    capture_editor_input_with_initial, format_note_lines, normalize_content, note_to_list_item,
    open_store, require_confirmation, resolve_by_prefix, resolve_note_content, AppContext,
    NoteListItem,
};
use crate::error::CliError;

pub fn run_note(ctx: &AppContext, command: NoteCommands) -> Result<(), CliError> {
    match command {
        NoteCommands::Add { content } => run_note_add(ctx, &content),
        NoteCommands::List { limit, json } => run_note_list(ctx, limit, json),
        NoteCommands::Edit { id, content } => run_note_edit(ctx, &id, &content),
        NoteCommands::Delete { id } => run_note_delete(ctx, &id),
        NoteCommands::Reset { yes } => {
            require_confirmation(yes, "delete every note")?;
            let mut store = open_store(ctx)?;
            store.reset_notes()?;
            store.shutdown();
            println!("All notes deleted");
            Ok(())
        }
    }
}

pub fn run_note_add(ctx: &AppContext, content_parts: &[String]) -> Result<(), CliError> {
    let content = resolve_note_content(content_parts)?;

    let mut store = open_store(ctx)?;
    let note = store.add_note(content)?;
    store.shutdown();

    println!("{}", note.id);
    Ok(())
}

fn run_note_list(ctx: &AppContext, limit: usize, as_json: bool) -> Result<(), CliError> {
    let store = open_store(ctx)?;
    let notes = store.notes().iter().take(limit).cloned().collect::<Vec<_>>();
    store.shutdown();
    let now = Utc::now();

    if as_json {
        let json_items = notes
            .iter()
            .map(|note| note_to_list_item(note, now))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if notes.is_empty() {
        println!("No notes yet.");
    } else {
        for line in format_note_lines(&notes, now) {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_note_edit(ctx: &AppContext, id: &str, content_parts: &[String]) -> Result<(), CliError> {
    let mut store = open_store(ctx)?;
    let note = resolve_note(store.notes(), id)?.clone();

    let edited = match normalize_content(&content_parts.join(" ")) {
        Some(content) => content,
        None => capture_editor_input_with_initial(&note.content)?
            .ok_or(CliError::EmptyEditedContent)?,
    };

    if edited != note.content {
        store.update_note(&note.id, edited)?;
    }
    store.shutdown();

    println!("{}", note.id);
    Ok(())
}

fn run_note_delete(ctx: &AppContext, id: &str) -> Result<(), CliError> {
    let mut store = open_store(ctx)?;
    let note = resolve_note(store.notes(), id)?.clone();

    store.delete_note(&note.id)?;
    store.shutdown();

    println!("{}", note.id);
    Ok(())
}

pub fn resolve_note<'a>(notes: &'a [Note], query: &str) -> Result<&'a Note, CliError> {
    resolve_by_prefix(query, notes, |note| note.id.to_string(), "Note")
}
