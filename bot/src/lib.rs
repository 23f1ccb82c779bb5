//! Shipbot Library
//!
//! Core modules for the Slack-driven deployment bot.

pub mod config;
pub mod control_plane;
pub mod deploy;
pub mod errors;
pub mod logs;
pub mod secrets;
pub mod server;
pub mod slack;
