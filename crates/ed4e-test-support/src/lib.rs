//! Shared test mocks and utilities for the ED4E test resolution engine.

mod clock;
mod documents;
mod rng;

pub use clock::FixedClock;
pub use documents::FailingDocuments;
pub use rng::{MockRng, SequenceRng};
