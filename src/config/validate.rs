// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - the interpreter argv names at least the interpreter binary
/// - the timed stage has a non-empty name
/// - the blocking budget is at least one second
///
/// It does **not** check that any of the configured paths exist: stage
/// directories and modules are allowed to be absent at runtime.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_interpreter(cfg)?;
    validate_stage(cfg)?;
    Ok(())
}

fn validate_interpreter(cfg: &ConfigFile) -> Result<()> {
    if cfg.shell.interpreter.is_empty() {
        return Err(anyhow!(
            "[shell].interpreter must name at least the interpreter binary"
        ));
    }
    Ok(())
}

fn validate_stage(cfg: &ConfigFile) -> Result<()> {
    if cfg.stage.timed.trim().is_empty() {
        return Err(anyhow!("[stage].timed must not be empty"));
    }
    if cfg.stage.budget_secs == 0 {
        return Err(anyhow!("[stage].budget_secs must be >= 1 (got 0)"));
    }
    Ok(())
}
