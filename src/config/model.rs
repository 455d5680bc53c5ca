// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths]
/// state_root = "/data/adb"
/// module_root = "/data/adb/modules"
///
/// [shell]
/// interpreter = ["/data/adb/stagerun/busybox", "sh"]
///
/// [stage]
/// timed = "post-mount"
/// budget_secs = 35
/// ```
///
/// All sections are optional and have defaults suitable for a stock install.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ConfigFile {
    /// Filesystem roots from `[paths]`.
    #[serde(default)]
    pub paths: PathsSection,

    /// Interpreter configuration from `[shell]`.
    #[serde(default)]
    pub shell: ShellSection,

    /// Timed-stage configuration from `[stage]`.
    #[serde(default)]
    pub stage: StageSection,

    /// Script environment extras from `[env]`.
    #[serde(default)]
    pub env: EnvSection,
}

/// `[paths]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Root holding the `<stage>.d` script directories.
    #[serde(default = "default_state_root")]
    pub state_root: PathBuf,

    /// Root holding one directory per installed module.
    #[serde(default = "default_module_root")]
    pub module_root: PathBuf,

    /// Private runtime directory appended to every script's `PATH`.
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,

    /// Support files consumed by the install flows.
    #[serde(default = "default_support_dir")]
    pub support_dir: PathBuf,
}

fn default_state_root() -> PathBuf {
    PathBuf::from("/data/adb")
}

fn default_module_root() -> PathBuf {
    PathBuf::from("/data/adb/modules")
}

fn default_runtime_dir() -> PathBuf {
    PathBuf::from("/dev/stagerun")
}

fn default_support_dir() -> PathBuf {
    PathBuf::from("/data/adb/stagerun")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            state_root: default_state_root(),
            module_root: default_module_root(),
            runtime_dir: default_runtime_dir(),
            support_dir: default_support_dir(),
        }
    }
}

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSection {
    /// Argv prefix used to run scripts, e.g. `["/path/busybox", "sh"]`.
    ///
    /// The script path is appended as the final argument.
    #[serde(default = "default_interpreter")]
    pub interpreter: Vec<String>,

    /// System shell used by the install flows.
    #[serde(default = "default_system_shell")]
    pub system: PathBuf,
}

fn default_interpreter() -> Vec<String> {
    vec!["/data/adb/stagerun/busybox".to_string(), "sh".to_string()]
}

fn default_system_shell() -> PathBuf {
    PathBuf::from("/system/bin/sh")
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            system: default_system_shell(),
        }
    }
}

/// `[stage]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StageSection {
    /// Name of the one stage whose blocking time is bounded.
    #[serde(default = "default_timed_stage")]
    pub timed: String,

    /// Wall-clock budget, in seconds, for the timed stage.
    #[serde(default = "default_budget_secs")]
    pub budget_secs: u64,
}

fn default_timed_stage() -> String {
    "post-mount".to_string()
}

fn default_budget_secs() -> u64 {
    35
}

impl Default for StageSection {
    fn default() -> Self {
        Self {
            timed: default_timed_stage(),
            budget_secs: default_budget_secs(),
        }
    }
}

/// `[env]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvSection {
    /// Optional env var name exported as `=1` to every script when set.
    #[serde(default)]
    pub feature_flag: Option<String>,
}

impl ConfigFile {
    /// Directory holding the scripts of `stage`.
    pub fn stage_dir(&self, stage: &str) -> PathBuf {
        self.paths.state_root.join(format!("{stage}.d"))
    }

    /// Whether `stage` is the one distinguished deadline-bounded stage.
    pub fn is_timed(&self, stage: &str) -> bool {
        stage == self.stage.timed
    }

    /// Wall-clock blocking budget for the timed stage.
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.stage.budget_secs)
    }

    /// Full argv for running `script` through the configured interpreter.
    pub fn script_argv(&self, script: &Path) -> Vec<String> {
        let mut argv = self.shell.interpreter.clone();
        argv.push(script.display().to_string());
        argv
    }
}
