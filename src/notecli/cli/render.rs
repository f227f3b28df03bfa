//! # Rendering
//!
//! Every function here builds a `String` from command results so that the
//! layout can be tested without a terminal; the `print_*` wrappers only
//! write those strings out.
//!
//! Width math stays Unicode-aware: titles are truncated by display width,
//! not by `char` count.

use super::styles::{INDEX, MARKER, MUTED, NOTEBOOK, TIME, TITLE};
use chrono::{DateTime, Utc};
use colored::Colorize;
use notecli::api::{CmdMessage, MessageLevel};
use notecli::commands::{ListedCredential, ListedNote, ListedNotebook, NoteView};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const NOTEBOOK_WIDTH: usize = 20;
const ACTIVE_MARKER: &str = "*";

pub fn render_note_list(notes: &[ListedNote]) -> String {
    let mut out = String::new();
    let idx_width = notes.len().to_string().len() + 1;
    for listed in notes {
        let idx = format!("{:>width$}.", listed.index, width = idx_width);
        let notebook = truncate_to_width(
            listed.notebook_name.as_deref().unwrap_or(""),
            NOTEBOOK_WIDTH,
        );
        let notebook = format!(
            "{}{}",
            notebook,
            " ".repeat(NOTEBOOK_WIDTH.saturating_sub(notebook.width()))
        );

        let fixed = idx.width() + 1 + NOTEBOOK_WIDTH + 1 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let title = truncate_to_width(&listed.note.title, available);
        let padding = " ".repeat(available.saturating_sub(title.width()));

        out.push_str(&format!(
            "{} {}{} {}{}\n",
            INDEX.apply_to(idx),
            title,
            padding,
            NOTEBOOK.apply_to(notebook),
            TIME.apply_to(format_time_ago(listed.note.updated)),
        ));
    }
    out
}

pub fn render_notebook_list(notebooks: &[ListedNotebook]) -> String {
    if notebooks.is_empty() {
        return format!("{}\n", MUTED.apply_to("No notebooks found."));
    }
    let mut out = String::new();
    for listed in notebooks {
        let notebook = &listed.notebook;
        let mut line = format!("{} {}", INDEX.apply_to(format!("{:>3}.", listed.index)), notebook.name);
        if let Some(stack) = &notebook.stack {
            line.push_str(&format!(" {}", MUTED.apply_to(format!("[{}]", stack))));
        }
        if notebook.is_default {
            line.push_str(&format!(" {}", MARKER.apply_to("(default)")));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_credential_list(credentials: &[ListedCredential], show_secret: bool) -> String {
    let mut out = String::new();
    for listed in credentials {
        let credential = &listed.credential;
        let marker = if listed.active { ACTIVE_MARKER } else { " " };
        let mut line = format!(
            "{} {} {} {}",
            MARKER.apply_to(marker),
            INDEX.apply_to(format!("{:>3}.", listed.index)),
            credential.name,
            MUTED.apply_to(format!("({})", credential.kind)),
        );
        if show_secret {
            line.push_str(&format!("  {}", credential.secret));
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_note_view(view: &NoteView) -> String {
    let mut out = format!("{}\n", TITLE.apply_to(&view.note.title));
    let mut meta = Vec::new();
    if let Some(name) = &view.notebook_name {
        meta.push(NOTEBOOK.apply_to(name).to_string());
    }
    if let Some(updated) = view.note.updated {
        meta.push(TIME.apply_to(format_time_ago(updated).trim_start()).to_string());
    }
    if !meta.is_empty() {
        out.push_str(&meta.join(" "));
        out.push('\n');
    }
    out.push_str(&"-".repeat(32));
    out.push('\n');
    out.push_str(view.body.trim_end());
    out.push('\n');
    out
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        out.push_str(&line.to_string());
        out.push('\n');
    }
    out
}

pub fn print_messages(messages: &[CmdMessage]) {
    print!("{}", render_messages(messages));
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
