//! Deployment domain: revision catalog, workflow machine, fleet listing

pub mod catalog;
pub mod fleet;
pub mod machine;
