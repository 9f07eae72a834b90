//! Core library modules of tmop.
//!
//! - **Infrastructure**: configuration, data storage, errors, messages
//! - **Domain**: date ranges, time entry helpers, the check/copy workflows,
//!   the day-by-day diff
//! - **User interface**: prompts, tables, formatting, templates
//!
//! ```rust,no_run
//! use tmop::libs::config::Config;
//! use tmop::libs::date_range::DateRange;
//!
//! let config = Config::load(None)?;
//! let range = DateRange::current_month();
//! # Ok::<(), tmop::libs::error::Error>(())
//! ```

pub mod config;
pub mod data_storage;
pub mod date_range;
pub mod diff;
pub mod error;
pub mod formatter;
pub mod messages;
pub mod prompt;
pub mod sync;
pub mod template;
pub mod time_entry;
pub mod view;
