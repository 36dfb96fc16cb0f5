//! Scan the followers or friends of an account, cache their profiles locally and render a
//! filtered Markdown report.
//!
//! The pipeline lives in [account_scan_core] and talks to the remote API through the
//! [twitter] client. This crate adds the command line, configuration and logging around it.

pub mod cli;
pub mod config;
pub mod logging;
pub mod run;
pub mod viewer;

pub use account_scan_core::*;
pub use account_scan_twitter as twitter;
