//! Slack integration: message model, interaction codec, Web API client

pub mod client;
pub mod codec;
pub mod types;
