//! Badge studio: CLI front end over the label engine.

pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod config;
pub mod scratch;
pub mod services;
pub mod session;

pub use bootstrap::init_tracing;
pub use commands::run;
pub use session::Session;
