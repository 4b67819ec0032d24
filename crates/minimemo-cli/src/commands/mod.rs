pub mod auth;
pub mod common;
pub mod completions;
pub mod config;
pub mod note;
pub mod reset;
pub mod schedule;
pub mod sync;
pub mod watch;
