//! Commands for the test resolution engine.

use ed4e_core::command::Command;
use uuid::Uuid;

use super::data::TestData;

/// Command to prepare and roll one test.
#[derive(Debug, Clone)]
pub struct RollTest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The test to roll.
    pub data: TestData,
    /// Actor rolling the test, seeded into `data` before preparation.
    pub actor_id: Option<Uuid>,
}

impl Command for RollTest {
    fn command_type(&self) -> &'static str {
        "rules.roll_test"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
