//! Core functionality shared across all toolbelt components.
//!
//! The request handlers live here as plain functions from a typed request
//! to a typed response or an [`ApiError`]. Configuration, logging bootstrap
//! and the `doctor` diagnostics are shared by the server and the CLI.

pub mod abbreviation;
pub mod calculator;
pub mod config;
pub mod credentials;
pub mod doctor;
pub mod error;
pub mod logging;
pub mod test_support;

pub use error::{ApiError, ErrorKind};
