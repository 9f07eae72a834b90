//! # tmop - Tmetric to OpenProject
//!
//! A command-line utility that reconciles time tracked in Tmetric with the
//! bookings in OpenProject.
//!
//! ## Features
//!
//! - **Copy**: book Tmetric entries in OpenProject and tag them as transferred
//! - **Check**: assign missing work types and work package links interactively
//! - **Diff**: compare both services day by day
//! - **Bill/Export**: render templates with data from both services
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tmop::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
