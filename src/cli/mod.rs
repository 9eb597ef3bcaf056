//! # CLI Module
//!
//! The `classrouter` command line: inspect what a configuration discovers and push
//! a single path through the router without standing up a server.
//!
//! ## Commands
//!
//! ### `list`
//!
//! Print every registered class and its dispatchable operations:
//!
//! ```bash
//! classrouter list
//! classrouter --config router.yaml list --json
//! ```
//!
//! ### `route`
//!
//! Dispatch one path and print the outcome as JSON. Exits non-zero when no operation
//! matched:
//!
//! ```bash
//! classrouter route /echo/echo/message/hi
//! classrouter --context api route /api/echo/ping -X POST -H x-tenant=acme
//! ```
//!
//! ## Global options
//!
//! - `--config <FILE>` - YAML config (see [`runtime_config`](crate::runtime_config)), also `CLASSROUTER_CONFIG`
//! - `--context <NAME>` - Required first path segment
//! - `--plugin-id <ID>` - Only load modules declaring this identity
//! - `--plugin-path <DIR>` - Extra plugin location, repeatable
//! - `--strict` - Reject requests whose arguments do not convert
//! - `--log-level <LEVEL>` - Overrides the configured level
//!
//! Command-line options win over environment variables, which win over the file.
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use classrouter::cli::run_cli;
//!
//! run_cli()?;
//! ```

mod commands;


pub use commands::{execute, run_cli, Cli, Commands, RouterArgs};
