//! ED4E Core — shared abstractions for the test resolution engine.
//!
//! This crate defines the traits and read-only document snapshots that the
//! rules crate depends on. Documents themselves are owned by the host; the
//! engine only ever sees snapshots resolved through [`document::DocumentResolver`].

pub mod clock;
pub mod command;
pub mod document;
pub mod error;
pub mod rng;
