//! # strato-cli
//!
//! Command-line interface for routers and security group rules on the cloud
//! control plane.
//!
//! # Architecture
//!
//! The CLI connects to the control-plane gateway via WebSocket using the
//! protocol defined in `strato-proto::api`. The [`client::GatewayClient`]
//! handles connection management and request/response serialization and
//! implements the traits in [`api`], which the command handlers are written
//! against.
//!
//! ```text
//! ┌────────────┐     API Protocol      ┌──────────────────┐
//! │ strato-cli │◄─────────────────────►│ control plane gw │
//! └────────────┘     (WebSocket)       └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod attrs;
pub mod bulk;
pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod format;
pub mod output;

pub use cli::{Cli, Commands, Format, RouterCommands, RuleCommands};
pub use client::GatewayClient;
pub use error::CliError;
pub use format::FormatterRegistry;
pub use output::OutputFormat;
