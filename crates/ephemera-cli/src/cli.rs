use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use ephemera_core::{ExpirationType, VERSION};

/// Ephemera - encrypted, self-destructing notes
#[derive(Parser)]
#[command(name = "ephemera")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the note database
    #[arg(long, global = true, env = "EPHEMERA_DB")]
    pub db: Option<String>,

    /// Act as this account (password from EPHEMERA_PASSWORD or a prompt)
    #[arg(short, long, global = true, value_name = "EMAIL")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file, generate a server key and create the database
    Init(InitArgs),

    /// Print a fresh base64 server key (for EPHEMERA_KEY)
    Keygen,

    /// Create a note
    Create(CreateArgs),

    /// Show a note's title and protection without viewing it
    Status(NoteIdArgs),

    /// View an unprotected note (view-once notes are destroyed)
    View(NoteIdArgs),

    /// View a password-protected note
    Unlock(UnlockArgs),

    /// Replace a note's content and optionally its title
    Edit(EditArgs),

    /// Delete a note
    Delete {
        /// Note ID
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List your notes (guest notes when no --user is given)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete every expired note
    Purge,

    /// Check database integrity
    Check,

    /// Manage accounts
    #[command(subcommand)]
    Account(AccountCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

impl Commands {
    /// Whether the command reads or writes note content and so needs the
    /// server key.
    pub fn needs_server_key(&self) -> bool {
        matches!(
            self,
            Commands::Create(_)
                | Commands::Status(_)
                | Commands::View(_)
                | Commands::Unlock(_)
                | Commands::Edit(_)
                | Commands::Delete { .. }
                | Commands::List { .. }
                | Commands::Purge
        )
    }
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Database path (defaults to the XDG data directory)
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Server key file path (defaults to the XDG config directory)
    #[arg(long)]
    pub key_file: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `create` command
#[derive(Args)]
pub struct CreateArgs {
    /// Note content (overrides stdin/editor)
    #[arg(long)]
    pub content: Option<String>,

    /// Note title
    #[arg(short, long)]
    pub title: Option<String>,

    /// When the note expires: never, time or view
    #[arg(short = 'x', long = "expire", value_name = "TYPE", default_value = "view")]
    pub expiration_type: ExpirationType,

    /// Lifetime of a time-based note (5m, 1h, 1d, 7d, 30d or "1 hour", ...)
    #[arg(short = 'w', long, value_name = "WINDOW")]
    pub ttl: Option<String>,

    /// Note password
    #[arg(long, env = "EPHEMERA_NOTE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Prompt for a note password
    #[arg(long, conflicts_with = "password")]
    pub protect: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// A command that takes only a note ID
#[derive(Args)]
pub struct NoteIdArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `unlock` command
#[derive(Args)]
pub struct UnlockArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Note password (prompted for when absent)
    #[arg(long, env = "EPHEMERA_NOTE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Note ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New content (overrides stdin/editor)
    #[arg(long)]
    pub content: Option<String>,

    /// New title (keeps the current one when absent)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Register a new account (password from EPHEMERA_PASSWORD or a prompt)
    Register {
        /// Account email
        #[arg(value_name = "EMAIL")]
        email: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Change the password of the --user account
    Password,

    /// Set or clear the display name of the --user account
    Profile {
        /// New display name; an empty value clears it
        #[arg(long)]
        name: String,
    },

    /// Show statistics for the --user account
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
