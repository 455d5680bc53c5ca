// src/lib.rs

pub mod cli;
pub mod config;
pub mod driver;
pub mod errors;
pub mod exec;
pub mod install;
pub mod logging;
pub mod stage;
pub mod supervisor;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, Command};
use crate::config::load_or_default;
use crate::driver::{exec_script, run_module_scripts, run_stage_scripts};
use crate::install::{install_module, install_package};
use crate::stage::scan_modules;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (a missing file means built-in defaults)
/// - the per-stage script driver and its deadline supervisor
/// - the install flows
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_or_default(&args.config)?;

    match args.command {
        Command::Stage {
            name,
            modules,
            skip_modules,
        } => {
            let deadline = run_stage_scripts(&cfg, &name);
            if skip_modules {
                debug!(stage = %name, "module phase skipped by flag");
                return Ok(());
            }
            let modules =
                modules.unwrap_or_else(|| scan_modules(&cfg.paths.module_root));
            run_module_scripts(&cfg, &name, &modules, deadline);
            Ok(())
        }
        Command::Script { path } => {
            exec_script(&cfg, &path);
            Ok(())
        }
        Command::InstallPackage { file } => install_package(&cfg, &file),
        Command::InstallModule { file } => install_module(&cfg, &file),
    }
}
