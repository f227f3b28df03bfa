//! Dispatch from parsed arguments to the API facades.
//!
//! `run()` sets up logging, resolves paths and configuration, then hands each
//! subcommand to a `handle_*` function that calls the API and prints the
//! result. Nothing here decides business rules.

use super::render::{
    print_messages, render_credential_list, render_note_list, render_note_view,
    render_notebook_list,
};
use super::setup::{Cli, Commands, NoteCommands, NotebookCommands, UserCommands};
use clap::Parser;
use notecli::api::CmdResult;
use notecli::editor::SystemEditor;
use notecli::error::{NoteError, Result};
use notecli::init::{initialize, NoteContext};
use notecli::model::CredentialKind;
use once_cell::sync::OnceCell;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

/// Overrides the log filter, e.g. `NOTECLI_LOG=notecli=trace`.
pub const LOG_ENV: &str = "NOTECLI_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = initialize()?;

    match cli.command {
        Commands::Note(cmd) => match cmd {
            NoteCommands::New {
                title,
                notebook,
                edit,
                raw,
            } => handle_note_new(&ctx, title, notebook, edit, raw),
            NoteCommands::Edit {
                note,
                title,
                notebook,
                raw,
                recover,
            } => handle_note_edit(&ctx, note, title, notebook, raw, recover),
            NoteCommands::Delete { notes, notebook } => handle_note_delete(&ctx, notes, notebook),
            NoteCommands::List {
                count,
                search,
                notebook,
            } => handle_note_list(&ctx, count, search, notebook),
            NoteCommands::View {
                note,
                notebook,
                raw,
            } => handle_note_view(&ctx, note, notebook, raw),
        },
        Commands::Notebook(cmd) => match cmd {
            NotebookCommands::List => handle_notebook_list(&ctx),
            NotebookCommands::New {
                name,
                stack,
                default,
            } => handle_notebook_new(&ctx, name, stack, default),
            NotebookCommands::Edit {
                notebook,
                name,
                stack,
            } => handle_notebook_edit(&ctx, notebook, name, stack),
        },
        Commands::User(cmd) => match cmd {
            UserCommands::Add {
                name,
                secret,
                sandbox,
            } => handle_user_add(&ctx, name, secret, sandbox),
            UserCommands::List { show_secret } => handle_user_list(&ctx, show_secret),
            UserCommands::Remove { indexes } => handle_user_remove(&ctx, indexes),
            UserCommands::Set { args } => handle_user_set(&ctx, args),
            UserCommands::Logout => handle_user_logout(&ctx),
        },
    }
}

fn init_tracing(verbose: bool) {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_init(|| {
        let level = std::env::var(LOG_ENV).unwrap_or_else(|_| {
            if verbose {
                "notecli=debug".to_string()
            } else {
                "warn".to_string()
            }
        });
        let env_filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    });
}

fn editor(ctx: &NoteContext) -> Result<SystemEditor> {
    let editor = SystemEditor::detect(ctx.config.editor.as_deref())?;
    tracing::debug!(editor = editor.command(), "editor selected");
    Ok(editor)
}

fn handle_note_new(
    ctx: &NoteContext,
    title: Option<String>,
    notebook: Option<String>,
    edit: bool,
    raw: bool,
) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = if edit {
        api.create_note_in_editor(&editor(ctx)?, title.as_deref(), notebook.as_deref(), raw)?
    } else {
        let title = title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| NoteError::Validation("a title is required without --edit".into()))?;
        api.create_note(title.trim(), notebook.as_deref())?
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_note_edit(
    ctx: &NoteContext,
    note: Option<String>,
    title: Option<String>,
    notebook: Option<String>,
    raw: bool,
    recover: bool,
) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = match note {
        _ if recover => api.recover_edit(&editor(ctx)?)?,
        Some(note) if title.is_some() || notebook.is_some() => {
            api.update_note(&note, title.as_deref(), notebook.as_deref())?
        }
        Some(note) => api.edit_note(&editor(ctx)?, &note, raw)?,
        None => return Err(NoteError::Validation("which note? give an index or a title".into())),
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_note_delete(ctx: &NoteContext, notes: Vec<String>, notebook: Option<String>) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = api.delete_notes(&notes, notebook.as_deref())?;
    finish_batch(&result)
}

fn handle_note_list(
    ctx: &NoteContext,
    count: Option<usize>,
    search: Option<String>,
    notebook: Option<String>,
) -> Result<()> {
    let mut api = ctx.note_api()?;
    let count = count.unwrap_or(ctx.config.list_count);
    let result = api.list_notes(search.as_deref(), notebook.as_deref(), count)?;
    print!("{}", render_note_list(&result.listed_notes));
    print_messages(&result.messages);
    Ok(())
}

fn handle_note_view(
    ctx: &NoteContext,
    note: String,
    notebook: Option<String>,
    raw: bool,
) -> Result<()> {
    let api = ctx.note_api()?;
    let result = api.view_note(&note, notebook.as_deref(), raw)?;
    if let Some(view) = &result.viewed {
        print!("{}", render_note_view(view));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_notebook_list(ctx: &NoteContext) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = api.list_notebooks()?;
    print!("{}", render_notebook_list(&result.listed_notebooks));
    print_messages(&result.messages);
    Ok(())
}

fn handle_notebook_new(
    ctx: &NoteContext,
    name: String,
    stack: Option<String>,
    default: bool,
) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = api.create_notebook(&name, stack.as_deref(), default)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_notebook_edit(
    ctx: &NoteContext,
    notebook: String,
    name: Option<String>,
    stack: Option<String>,
) -> Result<()> {
    let mut api = ctx.note_api()?;
    let result = api.update_notebook(&notebook, name.as_deref(), stack.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_user_add(
    ctx: &NoteContext,
    name: Option<String>,
    secret: Option<String>,
    sandbox: bool,
) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => prompt("Name: ")?,
    };
    let secret = match secret {
        Some(secret) => secret,
        None => prompt("Secret: ")?,
    };
    let kind = if sandbox {
        CredentialKind::Sandbox
    } else {
        CredentialKind::Standard
    };
    let result = ctx.user_api().add_credential(name.trim(), secret.trim(), kind)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_user_list(ctx: &NoteContext, show_secret: bool) -> Result<()> {
    let result = ctx.user_api().list_credentials()?;
    print!("{}", render_credential_list(&result.listed_credentials, show_secret));
    print_messages(&result.messages);
    Ok(())
}

fn handle_user_remove(ctx: &NoteContext, indexes: Vec<String>) -> Result<()> {
    let result = ctx.user_api().remove_credentials(&indexes)?;
    finish_batch(&result)
}

fn handle_user_set(ctx: &NoteContext, args: Vec<String>) -> Result<()> {
    let result = ctx.user_api().set(&args)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_user_logout(ctx: &NoteContext) -> Result<()> {
    let result = ctx.user_api().logout()?;
    print_messages(&result.messages);
    Ok(())
}

/// Prints the outcome of a batch; any failed entry makes the command fail.
fn finish_batch(result: &CmdResult) -> Result<()> {
    print_messages(&result.messages);
    match result.error_count() {
        0 => Ok(()),
        failed => Err(NoteError::PartialFailure(failed)),
    }
}

/// Reads one line from stdin. End of input is an error, not an empty value.
fn prompt(label: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err(NoteError::Validation(format!(
            "no value given for {}",
            label.trim_end_matches([':', ' '])
        )));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
