//! ED4E Rules — step-based test resolution.
//!
//! Turns a test's data bag into a step, a strain cost, and a target
//! difficulty, assembles the exploding dice pool the step table prescribes,
//! and counts the successes the roll achieves.

pub mod application;
pub mod domain;
