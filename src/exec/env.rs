// src/exec/env.rs

use std::env;

use crate::config::ConfigFile;

/// Environment marker telling the interpreter to run in standalone mode.
pub const STANDALONE_ENV: &str = "ASH_STANDALONE";

/// Build the pre-exec hook applied to every launched script.
///
/// Injects the standalone-interpreter marker, extends `PATH` with the private
/// runtime directory and, when configured, sets the feature marker.
pub fn script_env(cfg: &ConfigFile) -> impl Fn() + '_ {
    move || {
        // Runs in the forked child, between fork and exec.
        unsafe {
            env::set_var(STANDALONE_ENV, "1");
            let path = env::var("PATH").unwrap_or_default();
            env::set_var(
                "PATH",
                format!("{}:{}", path, cfg.paths.runtime_dir.display()),
            );
            if let Some(flag) = &cfg.env.feature_flag {
                env::set_var(flag, "1");
            }
        }
    }
}
