//! HTTP ingress: router, handlers, shared state

pub mod handlers;
pub mod serve;
pub mod state;
