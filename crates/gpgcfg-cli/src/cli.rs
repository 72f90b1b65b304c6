use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gpgcfg",
    version,
    about = "Inspect and change GnuPG component options through gpgconf",
    after_help = "\
Settings file lookup order:
  1. --config <path>             (explicit flag)
  2. $GPGCFG_CONFIG              (environment variable)
  3. ./gpgcfg.yaml               (project)
  4. Platform user config dir + /gpgcfg/config.yaml (e.g. ~/.config or %APPDATA%)
  5. Platform system config path (Unix: /etc/gpgcfg/config.yaml, Windows: %PROGRAMDATA%/gpgcfg/config.yaml)

Without any settings file gpgconf is looked up in PATH.

Environment variables:
  GPGCFG_CONFIG     Path to settings file (overrides default search)"
)]
pub(crate) struct Cli {
    /// Path to settings file (overrides GPGCFG_CONFIG and default search)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List the components gpgconf can configure
    Components,

    /// List every option of a component, grouped as gpgconf reports them
    Options {
        /// Component name (see `gpgcfg components`)
        component: String,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the current value of one option
    Get {
        component: String,
        option: String,

        /// Show type, flags and default as well
        #[arg(long)]
        details: bool,
    },

    /// Set one option and write it back through gpgconf
    Set {
        component: String,
        option: String,

        /// New value; list elements are separated by commas
        value: String,

        /// Only change the configuration file, not the running component
        #[arg(long)]
        no_runtime: bool,
    },

    /// Reset one option to its default and write it back through gpgconf
    Reset {
        component: String,
        option: String,

        /// Only change the configuration file, not the running component
        #[arg(long)]
        no_runtime: bool,
    },

    /// Generate a starter settings file
    Config {
        /// Output path (default: interactive prompt)
        dest: Option<String>,
    },
}

impl Commands {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Components => "components",
            Self::Options { .. } => "options",
            Self::Get { .. } => "get",
            Self::Set { .. } => "set",
            Self::Reset { .. } => "reset",
            Self::Config { .. } => "config",
        }
    }
}
