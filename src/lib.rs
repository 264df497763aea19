pub mod config;
pub mod github;
pub mod humanize;
pub mod mungers;
pub mod observability;
pub mod server;
pub mod worker;
