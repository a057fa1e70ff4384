//! Hierarchical mind maps: an arena-backed tree model, JSON persistence and an
//! interactive shell.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
