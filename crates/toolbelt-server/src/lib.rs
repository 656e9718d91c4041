//! HTTP surface of the toolbelt backend.
//!
//! [`router`] maps a method, path and body to a JSON reply without touching
//! the network; [`server`] owns the listening socket and the worker threads.

pub mod router;
pub mod server;

pub use router::{Reply, Route, Router};
pub use server::{ApiServer, RunningServer, ServerError};
