//! Command-line front end for semcache benchmark runs

pub mod commands;
mod execute;
pub mod logging;
pub mod prompts;

pub use commands::Commands;
