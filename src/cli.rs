// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `stagerun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stagerun",
    version,
    about = "Run boot-stage scripts under a wall-clock deadline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// A missing file is not an error: built-in defaults apply.
    #[arg(
        long,
        value_name = "PATH",
        default_value = "/data/adb/stagerun/config.toml"
    )]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STAGERUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of `stagerun`.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the `<name>.d` directory scripts, then the per-module scripts.
    Stage {
        /// Stage name, e.g. `post-mount`, `service`, `boot-complete`.
        name: String,

        /// Explicit module list (comma separated), in launch order.
        ///
        /// If omitted, the module root is scanned and disabled modules are
        /// skipped.
        #[arg(long, value_delimiter = ',', value_name = "NAMES")]
        modules: Option<Vec<String>>,

        /// Run only the directory phase, skipping module scripts.
        #[arg(long)]
        skip_modules: bool,
    },

    /// Run a single script synchronously with the script environment.
    Script {
        /// Path to the script file.
        path: PathBuf,
    },

    /// Stage a package file and install it via the platform package manager.
    InstallPackage {
        /// Path to the package file; deleted after installation.
        file: PathBuf,
    },

    /// Install a module archive (requires root).
    InstallModule {
        /// Path to the module archive.
        file: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
