use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "notecli", bin_name = "notecli", version)]
#[command(about = "Command-line client for your notes service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, edit, list, view and delete notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// List, create and edit notebooks
    #[command(subcommand)]
    Notebook(NotebookCommands),

    /// Manage stored credentials
    #[command(subcommand)]
    User(UserCommands),
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Create a new note
    #[command(alias = "create")]
    New {
        /// Note title (taken from the editor buffer when omitted with --edit)
        title: Option<String>,

        /// Notebook name or index from `notebook list`
        #[arg(short, long)]
        notebook: Option<String>,

        /// Write the content in the editor
        #[arg(short, long)]
        edit: bool,

        /// Edit the raw note markup instead of Markdown
        #[arg(long, requires = "edit")]
        raw: bool,
    },

    /// Edit a note's content, or change its title or notebook
    Edit {
        /// Index from `note list`, or the note title (`=2024` for a numeric title)
        #[arg(required_unless_present = "recover")]
        note: Option<String>,

        /// New title (skips the editor)
        #[arg(short, long)]
        title: Option<String>,

        /// Move to this notebook (skips the editor)
        #[arg(short, long)]
        notebook: Option<String>,

        /// Edit the raw note markup instead of Markdown
        #[arg(long)]
        raw: bool,

        /// Resume the last interrupted edit
        #[arg(long, conflicts_with_all = ["note", "title", "notebook", "raw"])]
        recover: bool,
    },

    /// Move notes to the trash
    #[command(alias = "rm")]
    Delete {
        /// Indexes from `note list` (several allowed), or one note title (`=` prefix forces a title)
        #[arg(required = true, num_args = 1..)]
        notes: Vec<String>,

        /// Notebook used to look up a note title
        #[arg(short, long)]
        notebook: Option<String>,
    },

    /// List notes, newest first
    #[command(alias = "ls")]
    List {
        /// Maximum number of notes
        #[arg(short, long)]
        count: Option<usize>,

        /// Search words
        #[arg(short, long)]
        search: Option<String>,

        /// Only notes of this notebook
        #[arg(short, long)]
        notebook: Option<String>,
    },

    /// Show a note
    View {
        /// Index from `note list`, or the note title (`=2024` for a numeric title)
        note: String,

        /// Notebook used to look up a note title
        #[arg(short, long)]
        notebook: Option<String>,

        /// Show the raw note markup
        #[arg(long)]
        raw: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotebookCommands {
    /// List notebooks
    #[command(alias = "ls")]
    List,

    /// Create a notebook
    New {
        name: String,

        /// Stack to file the notebook under
        #[arg(short, long)]
        stack: Option<String>,

        /// Make it the default notebook
        #[arg(long)]
        default: bool,
    },

    /// Rename a notebook or change its stack
    Edit {
        /// Index from `notebook list`, or the notebook name (`=` prefix forces a name)
        notebook: String,

        #[arg(long)]
        name: Option<String>,

        /// New stack; an empty value removes it
        #[arg(short, long)]
        stack: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Store a credential (prompts for missing values)
    Add {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        secret: Option<String>,

        /// The credential belongs to the sandbox service
        #[arg(long)]
        sandbox: bool,
    },

    /// List stored credentials
    #[command(alias = "ls")]
    List {
        /// Also print the secrets
        #[arg(long)]
        show_secret: bool,
    },

    /// Remove credentials by index
    #[command(alias = "rm")]
    Remove {
        #[arg(required = true, num_args = 1..)]
        indexes: Vec<String>,
    },

    /// Set an option, e.g. `user set credential 2`
    Set {
        #[arg(num_args = 0..)]
        args: Vec<String>,
    },

    /// Forget the active credential
    Logout,
}
