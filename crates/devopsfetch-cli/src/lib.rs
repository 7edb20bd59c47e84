//! devopsfetch front end - library modules.
//!
//! Everything the binary needs besides argument parsing:
//! - [`config`] - optional TOML configuration
//! - [`logging`] - append-only diagnostic log file
//! - [`render`] - tables and JSON output
//! - [`report`] - query dispatch against the live host
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Expected probe failures become printable text, not [`CliError`]

pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod report;

pub use config::Config;
pub use error::{CliError, Result};
pub use render::OutputFormat;
pub use report::Query;
