//! Domain layer: the step table, test preparation, and the roll engine.

pub mod commands;
pub mod config;
pub mod data;
pub mod dice;
pub mod flavor;
pub mod kinds;
pub mod parameters;
pub mod roll;
pub mod step_table;
pub mod step_value;
