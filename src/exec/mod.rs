// src/exec/mod.rs

//! Generic fork+exec process launching.

mod env;
mod launch;

pub use env::{script_env, STANDALONE_ENV};
pub use launch::{launch, ExecPolicy, ForkMode, Launched};
