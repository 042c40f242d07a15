use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use roster_business::{AdminRole, Gender, SortKey};

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Admin console for the Roster users API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Base URL of the users API
    #[arg(long, env = "ROSTER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Drop the saved session when the backend reports it expired
    #[arg(long, global = true)]
    pub logout_on_expired: bool,

    /// Where the session token is stored (defaults to the platform config directory)
    #[arg(long, env = "ROSTER_SESSION_FILE", value_name = "PATH", global = true)]
    pub session_file: Option<PathBuf>,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as an admin
    Login {
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Prompted for when omitted
        #[arg(long, short = 'p')]
        password: Option<String>,
    },
    /// Create a new admin account
    Register {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long, short = 'e')]
        email: Option<String>,

        #[arg(long, short = 'p')]
        password: Option<String>,

        #[arg(long, value_parser = parse_role)]
        role: Option<AdminRole>,
    },
    /// Sign out and forget the saved token
    Logout,
    /// Show configuration and session state
    Status {
        /// Also verify the token against the backend
        #[arg(long)]
        check: bool,
    },
    /// List users with statistics
    List {
        /// Case-insensitive match on names, residence or guardian
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Only show users of this gender
        #[arg(long, short = 'g', value_parser = parse_gender)]
        gender: Option<Gender>,

        /// Sort by: none, names, age
        #[arg(long, default_value = "none", value_parser = parse_sort)]
        sort: SortKey,
    },
    /// Add a user
    Add {
        #[command(flatten)]
        fields: UserFields,
    },
    /// Edit a user; given flags replace the current values
    Edit {
        /// User ID
        id: String,

        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user
    Delete {
        /// User ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Interactive dashboard
    Dashboard,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// User record fields accepted as flags by `add` and `edit`.
#[derive(Args, Debug, Clone, Default)]
pub struct UserFields {
    #[arg(long, short = 'n')]
    pub names: Option<String>,

    /// Kept as text so the form reports a bad value the same way it does for prompts
    #[arg(long, short = 'a')]
    pub age: Option<String>,

    /// Male, Female or Other
    #[arg(long, short = 'g', value_parser = parse_gender)]
    pub gender: Option<Gender>,

    #[arg(long, short = 'r')]
    pub residence: Option<String>,

    #[arg(long)]
    pub guardian: Option<String>,
}

impl UserFields {
    pub fn is_empty(&self) -> bool {
        self.names.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.residence.is_none()
            && self.guardian.is_none()
    }
}

fn parse_gender(value: &str) -> Result<Gender, String> {
    value.parse::<Gender>().map_err(|e| e.to_string())
}

fn parse_role(value: &str) -> Result<AdminRole, String> {
    value.parse()
}

fn parse_sort(value: &str) -> Result<SortKey, String> {
    value.parse()
}
