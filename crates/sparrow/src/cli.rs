//! Clap derive structures for the `sparrow` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sparrow -- sync and query Sparrow sensor data from Notehub
#[derive(Debug, Parser)]
#[command(
    name = "sparrow",
    version,
    about = "Sync Sparrow gateway and sensor data from Notehub",
    long_about = "Pulls gateways, nodes and recent events from a Notehub project\n\
        into an in-memory store, then answers queries over it.\n\n\
        Every data command starts with a fresh sync.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "SPARROW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Notehub API URL (overrides profile)
    #[arg(long, env = "SPARROW_HUB", global = true)]
    pub hub: Option<String>,

    /// Notehub project uid (overrides profile)
    #[arg(long, short = 'P', env = "SPARROW_PROJECT", global = true)]
    pub project: Option<String>,

    /// Notehub API token
    #[arg(long, env = "SPARROW_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "SPARROW_OUTPUT", default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "SPARROW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Event history window for sync, in hours
    #[arg(long, env = "SPARROW_HISTORY_HOURS", global = true)]
    pub history_hours: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a bulk import from the hub and report counts
    Sync,

    /// Show the latest reading of every sensor
    #[command(alias = "l")]
    Latest(LatestArgs),

    /// Count stored readings after a sync
    Count,

    /// Inspect and rename gateways and their nodes
    #[command(alias = "gw", alias = "g")]
    Gateways(GatewaysArgs),

    /// List recent project events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Latest ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LatestArgs {
    /// Only show this gateway (device uid)
    #[arg(long, short = 'g')]
    pub gateway: Option<String>,

    /// Only show this node (requires --gateway)
    #[arg(long, short = 'n', requires = "gateway")]
    pub node: Option<String>,

    /// Only show this sensor
    #[arg(long, short = 's')]
    pub sensor: Option<String>,
}

// ── Gateways ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GatewaysArgs {
    #[command(subcommand)]
    pub command: GatewaysCommand,
}

#[derive(Debug, Subcommand)]
pub enum GatewaysCommand {
    /// List gateways in the project
    #[command(alias = "ls")]
    List,

    /// Show a single gateway
    Get {
        /// Gateway device uid
        uid: String,
    },

    /// List nodes attached to gateways (all gateways when none given)
    Nodes {
        /// Gateway device uids
        uids: Vec<String>,
    },

    /// Set a gateway's display name
    Rename {
        /// Gateway device uid
        uid: String,
        /// New name
        name: String,
    },
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List events routed in the last N hours
    #[command(alias = "ls")]
    List {
        /// Look-back window in hours
        #[arg(long, default_value = "24")]
        hours: u32,

        /// Only events from this node
        #[arg(long)]
        node: Option<String>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile
    Init {
        /// Notehub project uid
        #[arg(long)]
        project: String,

        /// Notehub API URL
        #[arg(long)]
        hub: Option<String>,

        /// Store this token in the system keyring
        #[arg(long, conflicts_with = "token_env")]
        token: Option<String>,

        /// Read the token from this environment variable instead
        #[arg(long)]
        token_env: Option<String>,

        /// Save the token to the config file instead of the keyring
        #[arg(long, requires = "token")]
        plaintext: bool,
    },

    /// Show the current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Store a profile's API token in the system keyring
    SetToken {
        /// The API token
        token: String,
    },

    /// List profile names
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
