// src/driver.rs

//! Composition of enumerator, launcher and supervisor into the per-stage
//! entry points.
//!
//! Progress is reported through logging only; a script that fails to launch
//! never aborts its stage, and exit statuses are not inspected.

use std::path::Path;

use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::exec::{launch, script_env, ExecPolicy, ForkMode, Launched};
use crate::stage::{module_script, stage_scripts};
use crate::supervisor::{confine, Deadline, Supervisor};

/// Run one script synchronously with the standard script environment.
pub fn exec_script(cfg: &ConfigFile, script: &Path) {
    let env_hook = script_env(cfg);
    let policy = ExecPolicy {
        mode: ForkMode::Wait,
        pre_exec: Some(&env_hook),
    };
    if let Err(err) = launch(&policy, &cfg.script_argv(script)) {
        warn!(script = %script.display(), error = %err, "script launch failed");
    }
}

/// Run every executable script in `<state_root>/<stage>.d`.
///
/// For the timed stage this computes the stage deadline and returns it so
/// the module phase of the same invocation can inherit the remaining budget;
/// all other stages return `None` and run fire-and-forget.
pub fn run_stage_scripts(cfg: &ConfigFile, stage: &str) -> Option<Deadline> {
    info!("* running {stage}.d scripts");

    let deadline = cfg.is_timed(stage).then(|| Deadline::after(cfg.budget()));
    match deadline {
        Some(deadline) => {
            if let Err(err) = confine(deadline, |sup| launch_dir_scripts(cfg, stage, sup)) {
                warn!(stage, error = %err, "stage subtree failed; directory phase skipped");
            }
        }
        None => launch_dir_scripts(cfg, stage, &mut Supervisor::not_timed()),
    }
    deadline
}

/// Run the named script of each module, in the caller-supplied order.
///
/// `deadline` is the value returned by [`run_stage_scripts`] for the same
/// stage invocation. If it has already passed, the phase starts directly in
/// the non-blocking regime without arming a new timer; the module phase
/// never receives a fresh budget of its own.
pub fn run_module_scripts(
    cfg: &ConfigFile,
    stage: &str,
    modules: &[String],
    deadline: Option<Deadline>,
) {
    info!("* running module {stage} scripts");
    if modules.is_empty() {
        return;
    }

    match deadline {
        Some(deadline) if !deadline.passed() => {
            if let Err(err) =
                confine(deadline, |sup| launch_module_scripts(cfg, stage, modules, sup))
            {
                warn!(stage, error = %err, "stage subtree failed; module phase skipped");
            }
        }
        Some(_) => launch_module_scripts(cfg, stage, modules, &mut Supervisor::expired()),
        None => launch_module_scripts(cfg, stage, modules, &mut Supervisor::not_timed()),
    }
}

fn launch_dir_scripts(cfg: &ConfigFile, stage: &str, sup: &mut Supervisor) {
    for script in stage_scripts(&cfg.stage_dir(stage)) {
        let name = script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("{stage}.d: exec [{name}]");
        launch_one(cfg, &script, sup);
    }
}

fn launch_module_scripts(cfg: &ConfigFile, stage: &str, modules: &[String], sup: &mut Supervisor) {
    for module in modules {
        let Some(script) = module_script(&cfg.paths.module_root, module, stage) else {
            continue;
        };
        info!("{module}: exec [{stage}.sh]");
        launch_one(cfg, &script, sup);
    }
}

/// Launch one script under the supervisor's current gate, then give the
/// supervisor a chance to reap. Only a successful blocking launch may reap:
/// waiting after a failed fork would race the timer with no script running.
fn launch_one(cfg: &ConfigFile, script: &Path, sup: &mut Supervisor) {
    let env_hook = script_env(cfg);
    let policy = ExecPolicy {
        mode: sup.mode(),
        pre_exec: Some(&env_hook),
    };
    match launch(&policy, &cfg.script_argv(script)) {
        Ok(Launched::Detached(_)) => sup.reap(),
        Ok(_) => {}
        Err(err) => warn!(script = %script.display(), error = %err, "script launch failed"),
    }
}
