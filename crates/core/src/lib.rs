//! Core domain types, errors, and constants for `semcache`.
//!
//! This crate establishes the building blocks shared by the eviction engine,
//! the multi-policy gateway, and the command-line runner.
//!
//! ## Key Components
//!
//! - **`errors`**: The primary `Error` enum and `Result` alias, centralizing
//!   every failure mode the benchmark distinguishes (upstream timeouts,
//!   backend failures, accounting violations, configuration problems).
//! - **`types`**: Newtype wrappers (`CacheKey`, `RunTag`) that keep prompt
//!   fingerprints and backend context identifiers from being mixed up.
//! - **`constants`**: Shared defaults and environment variable names.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::{CacheKey, RunTag},
};
