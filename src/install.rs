// src/install.rs

//! Privilege-gated install flows.
//!
//! These sit outside the deadline supervisor: both run synchronously and are
//! fatal on precondition failure. Security labeling of staged files is the
//! platform's concern, not ours.

use std::env;
use std::ffi::CString;
use std::fs;
use std::os::fd::AsRawFd;
use std::path::Path;

use anyhow::{bail, Context, Result};
use nix::unistd::{access, execv, AccessFlags, Uid};
use tracing::info;

use crate::config::ConfigFile;
use crate::exec::{launch, ExecPolicy, ForkMode, STANDALONE_ENV};

/// Stage a package file and install it through the platform package manager.
///
/// The generated snippet installs the file and deletes it afterwards.
pub fn install_package(cfg: &ConfigFile, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("'{}' does not exist", file.display());
    }

    info!(file = %file.display(), "installing package");
    let snippet = format!(
        "PKG={pkg}\n\
         log -t stagerun \"package_install: $PKG\"\n\
         log -t stagerun \"package_install: $(pm install -r $PKG 2>&1)\"\n\
         rm -f $PKG\n",
        pkg = file.display()
    );
    let argv = vec![
        cfg.shell.system.display().to_string(),
        "-c".to_string(),
        snippet,
    ];

    let policy = ExecPolicy {
        mode: ForkMode::Wait,
        pre_exec: None,
    };
    launch(&policy, &argv).context("running package install snippet")?;
    Ok(())
}

/// Install a module archive by handing over to the support shell.
///
/// Checks root privilege and the support files, then replaces the current
/// process image; returns only on failure.
pub fn install_module(cfg: &ConfigFile, file: &Path) -> Result<()> {
    if !Uid::effective().is_root() {
        bail!("run this command as root");
    }

    let support = &cfg.paths.support_dir;
    let functions = support.join("functions.sh");
    let Some(shell_bin) = cfg.shell.interpreter.first() else {
        bail!("no interpreter configured");
    };
    if !support.is_dir()
        || access(Path::new(shell_bin), AccessFlags::X_OK).is_err()
        || !functions.is_file()
    {
        bail!("incomplete stagerun install under '{}'", support.display());
    }
    if !file.exists() {
        bail!("'{}' does not exist", file.display());
    }

    let archive = fs::canonicalize(file)
        .with_context(|| format!("resolving '{}'", file.display()))?;
    unsafe {
        env::set_var("OUTFD", "1");
        env::set_var("ZIPFILE", &archive);
        env::set_var(STANDALONE_ENV, "1");
    }

    // Install output goes to stdout only.
    let devnull = fs::File::open("/dev/null").context("opening /dev/null")?;
    unsafe { libc::dup2(devnull.as_raw_fd(), libc::STDERR_FILENO) };
    drop(devnull);

    let snippet = format!(
        "exec {shell} sh -c '. {functions}\ninstall_module\nexit 0'",
        shell = shell_bin,
        functions = functions.display()
    );
    let argv = [
        cfg.shell.system.display().to_string(),
        "-c".to_string(),
        snippet,
    ];
    let cargs = argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .context("building shell argv")?;

    let _ = execv(&cargs[0], &cargs);
    bail!("failed to execute the system shell")
}
