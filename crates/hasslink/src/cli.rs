//! Clap derive structures for the `hasslink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hasslink -- watch and drive a Home Assistant hub from the command line
#[derive(Debug, Parser)]
#[command(
    name = "hasslink",
    version,
    about = "Watch and control a Home Assistant hub over its WebSocket API",
    long_about = "Streams entity states and device events from a Home Assistant hub\n\
        and issues service calls, reconnecting automatically when the\n\
        connection drops.",
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
    /// Hub profile to use
    #[arg(long, short = 'p', env = "HASSLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Hub host name or address (overrides profile)
    #[arg(long, short = 'H', env = "HASSLINK_HOST", global = true)]
    pub host: Option<String>,

    /// Hub port (overrides profile)
    #[arg(long, env = "HASSLINK_PORT", global = true)]
    pub port: Option<u16>,

    /// Connect over wss://
    #[arg(long, global = true)]
    pub tls: bool,

    /// Long-lived access token (overrides profile, keyring and HASSLINK_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HASSLINK_OUTPUT",
        default_value = "plain",
        global = true
    )]
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

    /// Give up on a service call after this many seconds
    #[arg(long, env = "HASSLINK_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// One line per item (default)
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
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
    /// Print entity states: the current snapshot, then every change
    #[command(alias = "st")]
    States(StatesArgs),

    /// Print device events (button presses and the like)
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// Call a service on one entity
    Call(CallArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STREAMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatesArgs {
    /// Stop after this many items
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Only print entities whose id starts with this prefix (e.g. "light.")
    #[arg(long, short = 'e')]
    pub entity: Option<String>,
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Stop after this many items
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,

    /// Event type to subscribe to (overrides profile)
    #[arg(long)]
    pub event_type: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CALL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CallArgs {
    /// Service domain: light, switch, input_boolean, media_player, timer
    pub domain: String,

    /// Service within the domain, e.g. turn_on, toggle, media_play, start
    pub action: String,

    /// Target entity id, e.g. light.desk
    pub entity: String,

    /// Light brightness (0-255, default 255)
    #[arg(long, short = 'b')]
    pub brightness: Option<u8>,

    /// Light color as R,G,B (e.g. 255,120,0)
    #[arg(long, value_name = "R,G,B")]
    pub rgb: Option<String>,

    /// Light color temperature in kelvin
    #[arg(long)]
    pub kelvin: Option<u32>,

    /// Media URL for play_media
    #[arg(long)]
    pub url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Set a profile value (host, port, tls, access_token_env, event_type,
    /// reconnect_cooldown_secs, shutdown_timeout_secs)
    Set {
        /// Config key
        key: String,
        /// Value to set
        value: String,
    },

    /// Prompt for an access token and store it in the system keyring
    /// (for the profile chosen with --profile, else the default one)
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
