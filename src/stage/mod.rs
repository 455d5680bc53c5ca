// src/stage/mod.rs

//! Discovery of stage scripts and module scripts on disk.

mod enumerate;
mod modules;

pub use enumerate::stage_scripts;
pub use modules::{module_script, scan_modules};
