//! Route modules.

pub mod health;
pub mod resolution;
pub mod steps;
