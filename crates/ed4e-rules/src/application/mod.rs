//! Application layer: command and query handlers over the domain.

pub mod command_handlers;
pub mod query_handlers;
