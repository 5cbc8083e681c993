//! CLI command implementations

pub mod batch;
pub mod completions;
pub mod config;
pub mod inspect;
pub mod io;
pub mod route;
