//! Shared application state.

use std::sync::{Arc, Mutex};

use ed4e_core::clock::Clock;
use ed4e_core::rng::DeterministicRng;
use ed4e_rules::domain::config::RulesConfig;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Rules configuration, fixed at startup.
    pub config: Arc<RulesConfig>,
    /// Clock used to timestamp roll records.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// Dice source, locked only while a roll is evaluated.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        config: Arc<RulesConfig>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    ) -> Self {
        Self { config, clock, rng }
    }
}
