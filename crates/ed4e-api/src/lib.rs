//! ED4E API — HTTP surface of the test resolution engine.

pub mod error;
pub mod routes;
pub mod state;
