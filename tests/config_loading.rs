use std::error::Error;
use std::fs;
use std::path::PathBuf;

use stagerun::config::{load_and_validate, load_or_default};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn defaults_apply_without_a_config_file() -> TestResult {
    let missing = PathBuf::from("/no/such/config.toml");
    let cfg = load_or_default(&missing)?;

    assert_eq!(cfg.stage.timed, "post-mount");
    assert_eq!(cfg.stage.budget_secs, 35);
    assert!(!cfg.shell.interpreter.is_empty());
    assert!(cfg.env.feature_flag.is_none());
    Ok(())
}

#[test]
fn toml_sections_override_defaults() -> TestResult {
    let tmp = tempdir()?;
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[paths]
state_root = "/run/stages"

[stage]
timed = "early"
budget_secs = 5

[env]
feature_flag = "PRELOAD_ENABLED"
"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.paths.state_root, PathBuf::from("/run/stages"));
    assert_eq!(cfg.stage_dir("early"), PathBuf::from("/run/stages/early.d"));
    assert!(cfg.is_timed("early"));
    assert!(!cfg.is_timed("post-mount"));
    assert_eq!(cfg.budget().as_secs(), 5);
    assert_eq!(cfg.env.feature_flag.as_deref(), Some("PRELOAD_ENABLED"));
    // Untouched sections keep their defaults.
    assert_eq!(cfg.paths.module_root, PathBuf::from("/data/adb/modules"));
    Ok(())
}

#[test]
fn zero_budget_is_rejected() -> TestResult {
    let tmp = tempdir()?;
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[stage]\nbudget_secs = 0\n")?;

    assert!(load_and_validate(&path).is_err());
    Ok(())
}

#[test]
fn empty_interpreter_is_rejected() -> TestResult {
    let tmp = tempdir()?;
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[shell]\ninterpreter = []\n")?;

    assert!(load_and_validate(&path).is_err());
    Ok(())
}

#[test]
fn script_argv_appends_the_script_path() -> TestResult {
    let missing = PathBuf::from("/no/such/config.toml");
    let cfg = load_or_default(&missing)?;

    let argv = cfg.script_argv(&PathBuf::from("/tmp/10-demo"));
    assert_eq!(argv.last().map(String::as_str), Some("/tmp/10-demo"));
    assert_eq!(argv.len(), cfg.shell.interpreter.len() + 1);
    Ok(())
}
