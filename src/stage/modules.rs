// src/stage/modules.rs

use std::fs;
use std::path::{Path, PathBuf};

/// Resolve the fixed-named per-module script for `stage`, if present.
///
/// Absent scripts are not an error; the module is simply skipped.
pub fn module_script(module_root: &Path, module: &str, stage: &str) -> Option<PathBuf> {
    let path = module_root.join(module).join(format!("{stage}.sh"));
    path.is_file().then_some(path)
}

/// List installed module names in sorted order.
///
/// Hidden entries and modules marked `disable` or `remove` are skipped.
pub fn scan_modules(module_root: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(module_root) else {
        return Vec::new();
    };

    let mut modules: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .filter(|name| {
            let dir = module_root.join(name);
            !dir.join("disable").exists() && !dir.join("remove").exists()
        })
        .collect();
    modules.sort();
    modules
}
