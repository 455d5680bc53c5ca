use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use stagerun::config::ConfigFile;
use stagerun::driver::run_stage_scripts;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

fn test_config(root: &Path, budget_secs: u64) -> ConfigFile {
    let mut cfg = ConfigFile::default();
    cfg.paths.state_root = root.join("state");
    cfg.paths.module_root = root.join("modules");
    cfg.paths.runtime_dir = root.join("runtime");
    cfg.shell.interpreter = vec!["/bin/sh".to_string()];
    cfg.stage.timed = "post-mount".to_string();
    cfg.stage.budget_secs = budget_secs;
    cfg
}

fn write_script(dir: &Path, name: &str, body: &str) -> TestResult {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

fn wait_for(path: &Path, limit: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < limit {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(50));
    }
    path.exists()
}

// Scenario: one script exits immediately, one runs well past the budget.
// The driver must return once the budget is spent, leaving the slow script
// to finish on its own.
#[test]
fn timed_stage_blocks_at_most_the_budget() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(tmp.path(), 1);
    let dir = cfg.stage_dir("post-mount");
    fs::create_dir_all(&dir)?;

    let fast_marker = tmp.path().join("fast.ran");
    let slow_marker = tmp.path().join("slow.ran");
    write_script(&dir, "10-fast", &format!("touch {}", fast_marker.display()))?;
    write_script(
        &dir,
        "20-slow",
        &format!("sleep 5\ntouch {}", slow_marker.display()),
    )?;

    let started = Instant::now();
    let deadline = run_stage_scripts(&cfg, "post-mount");
    let elapsed = started.elapsed();

    assert!(deadline.is_some(), "timed stage must yield a deadline");
    assert!(elapsed < Duration::from_secs(4), "blocked for {elapsed:?}");
    assert!(
        !slow_marker.exists(),
        "driver waited for the slow script to finish"
    );
    // Launch order is directory order; the fast script may have gone out
    // detached after the timeout, so give its marker a moment.
    assert!(wait_for(&fast_marker, Duration::from_secs(3)));
    Ok(())
}

#[test]
fn fast_scripts_finish_well_under_the_budget() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(tmp.path(), 30);
    let dir = cfg.stage_dir("post-mount");
    fs::create_dir_all(&dir)?;

    let first = tmp.path().join("first.ran");
    let second = tmp.path().join("second.ran");
    write_script(&dir, "10-first", &format!("touch {}", first.display()))?;
    write_script(&dir, "20-second", &format!("touch {}", second.display()))?;

    let started = Instant::now();
    run_stage_scripts(&cfg, "post-mount");
    let elapsed = started.elapsed();

    // No timeout: every script was waited for and the timer did not hold
    // the subtree open, so the stage ends as soon as the scripts do.
    assert!(elapsed < Duration::from_secs(5), "stage took {elapsed:?}");
    assert!(first.exists());
    assert!(second.exists());
    Ok(())
}

#[test]
fn untimed_stage_runs_fire_and_forget() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(tmp.path(), 35);
    let dir = cfg.stage_dir("service");
    fs::create_dir_all(&dir)?;

    let marker = tmp.path().join("service.ran");
    write_script(&dir, "10-mark", &format!("touch {}", marker.display()))?;

    let deadline = run_stage_scripts(&cfg, "service");

    assert!(deadline.is_none(), "untimed stage must not yield a deadline");
    assert!(wait_for(&marker, Duration::from_secs(5)));
    Ok(())
}

#[test]
fn empty_timed_stage_still_yields_the_deadline() -> TestResult {
    let tmp = tempdir()?;
    let cfg = test_config(tmp.path(), 30);

    let started = Instant::now();
    let deadline = run_stage_scripts(&cfg, "post-mount");
    let elapsed = started.elapsed();

    let deadline = deadline.expect("timed stage must yield a deadline");
    assert!(!deadline.passed(), "full budget should remain");
    assert!(elapsed < Duration::from_secs(5), "stage took {elapsed:?}");
    Ok(())
}
