//! Clap derive structures for the `powerview` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// powerview -- control Hunter Douglas PowerView shades from the command line
#[derive(Debug, Parser)]
#[command(
    name = "powerview",
    version,
    about = "Control PowerView shades from the command line",
    long_about = "Talks to a Hunter Douglas PowerView hub over its local HTTP API.\n\n\
        Shade mutations are sent one at a time and rapid updates to the same\n\
        shade are merged, so the hub is never flooded.",
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
    #[arg(long, env = "POWERVIEW_HUB", global = true)]
    pub hub: Option<String>,

    /// Hub address (overrides profile)
    #[arg(long, short = 'H', env = "POWERVIEW_HOST", global = true)]
    pub host: Option<String>,

    /// Output format (falls back to `defaults.output` in the config file)
    #[arg(long, short = 'o', env = "POWERVIEW_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "POWERVIEW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    /// The output format after config fallback has been applied.
    pub fn format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect and move shades
    #[command(alias = "s")]
    Shades(ShadesArgs),

    /// Hub information
    Hub(HubArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shades ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ShadesArgs {
    #[command(subcommand)]
    pub command: ShadesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ShadesCommand {
    /// List all shades
    #[command(alias = "ls")]
    List,

    /// Show one shade as last known by the hub
    Get {
        /// Shade ID
        shade: u32,
    },

    /// Make the hub poll a shade for its current position
    Refresh {
        /// Shade ID
        shade: u32,
    },

    /// Move a shade (percent by default, 0 = closed, 100 = open)
    Move(MoveArgs),

    /// Briefly jog a shade so it can be identified
    Jog {
        /// Shade ID
        shade: u32,
    },

    /// Recalibrate a shade's travel limits
    Calibrate {
        /// Shade ID
        shade: u32,
    },
}

#[derive(Debug, Args)]
pub struct MoveArgs {
    /// Shade ID
    pub shade: u32,

    /// Bottom rail position
    #[arg(long, short = 'b', conflicts_with = "vanes")]
    pub bottom: Option<u32>,

    /// Top rail position (top-down/bottom-up shades)
    #[arg(long, short = 't')]
    pub top: Option<u32>,

    /// Vane tilt
    #[arg(long)]
    pub vanes: Option<u32>,

    /// Interpret values as raw hub positions (0-65535) instead of percent
    #[arg(long)]
    pub raw: bool,
}

// ── Hub ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HubArgs {
    #[command(subcommand)]
    pub command: HubCommand,
}

#[derive(Debug, Subcommand)]
pub enum HubCommand {
    /// Show hub identity and network details
    Info,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
