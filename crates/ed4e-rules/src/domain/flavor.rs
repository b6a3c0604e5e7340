//! Flavor projection of an evaluated roll, consumed by the chat layer.

use serde::Serialize;

use super::dice::RollFormula;
use super::kinds::{RollType, TestKind, TestType};
use super::parameters::{Roller, TestParameters};
use super::roll::RollResult;

/// Target difficulty as shown in chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetFlavor {
    pub total: i32,
    /// Whether players may see `total`.
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatFlavor {
    pub roller: Option<Roller>,
    pub kind: TestKind,
    pub roll_type: RollType,
    pub test_type: TestType,
    pub step: i32,
    pub strain: i32,
    pub target: Option<TargetFlavor>,
    pub success: bool,
    pub failure: bool,
    pub rule_of_one: bool,
    pub num_successes: u32,
    pub num_extra_successes: u32,
    pub total: i32,
    pub formula: String,
}

impl ChatFlavor {
    #[must_use]
    pub fn new(parameters: &TestParameters, formula: &RollFormula, result: &RollResult) -> Self {
        Self {
            roller: parameters.roller().cloned(),
            kind: parameters.kind(),
            roll_type: parameters.roll_type(),
            test_type: parameters.test_type(),
            step: parameters.step().total(),
            strain: parameters.strain().total(),
            target: parameters.target().map(|t| TargetFlavor {
                total: t.total(),
                public: t.public,
            }),
            success: result.is_success,
            failure: result.is_failure,
            rule_of_one: result.is_rule_of_one,
            num_successes: result.num_successes,
            num_extra_successes: result.num_extra_successes,
            total: result.total,
            formula: formula.to_string(),
        }
    }
}
