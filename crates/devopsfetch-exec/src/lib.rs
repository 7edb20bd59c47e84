//! External command execution for devopsfetch.
//!
//! Probes that shell out (`nginx -T`, `last`, `journalctl`, `docker`) go
//! through the [`CommandRunner`] trait instead of calling
//! a process API directly. Tests substitute a closure.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Spawn failures and timeouts are returned as [`CommandError`]
//! - A non-zero exit is data ([`CommandOutput::code`]), not an error, until
//!   the caller asks for [`CommandOutput::into_success`]

pub mod error;
pub mod runner;

pub use error::CommandError;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
