//! Dice pool assembly and exploding rolls.

use std::fmt;

use ed4e_core::rng::DeterministicRng;
use serde::Serialize;

use super::parameters::TestParameters;
use super::step_table::{StepDice, step_dice};

/// One additive group of dice, rolled at a step and optionally labelled
/// for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceGroup {
    pub label: Option<String>,
    pub step: i32,
}

impl DiceGroup {
    #[must_use]
    pub fn new(step: i32, label: Option<String>) -> Self {
        Self { label, step }
    }

    #[must_use]
    pub fn dice(&self) -> &'static StepDice {
        step_dice(self.step)
    }

    /// Exploding formula of the group, e.g. `1d8x+1d6x[karma 1]`.
    #[must_use]
    pub fn formula(&self) -> String {
        let dice = self.dice();
        let terms = dice
            .terms
            .iter()
            .map(|t| format!("{}d{}x", t.count, t.faces))
            .collect::<Vec<_>>()
            .join("+");
        let modifier = match dice.modifier {
            0 => String::new(),
            m => format!("{m:+}"),
        };
        let label = self
            .label
            .as_ref()
            .map(|l| format!("[{l}]"))
            .unwrap_or_default();
        format!("{terms}{modifier}{label}")
    }

    /// Rolls every die of the group, each exploding independently.
    pub fn roll(&self, rng: &mut dyn DeterministicRng, max_explosions: u32) -> GroupOutcome {
        let dice = self.dice();
        let rolls: Vec<DieRoll> = dice
            .terms
            .iter()
            .flat_map(|t| std::iter::repeat_n(t.faces, t.count as usize))
            .map(|faces| DieRoll::exploding(faces, &mut *rng, max_explosions))
            .collect();
        let sum: i32 = rolls.iter().map(DieRoll::total).sum();
        GroupOutcome {
            label: self.label.clone(),
            step: self.step,
            formula: self.formula(),
            modifier: dice.modifier,
            total: sum + dice.modifier,
            dice: rolls,
        }
    }
}

/// The full dice expression of a test, in assembly order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RollFormula {
    pub groups: Vec<DiceGroup>,
}

impl RollFormula {
    /// Builds the pool: the step's own dice, then one group per spent
    /// resource point, then one group per extra-dice entry.
    #[must_use]
    pub fn assemble(parameters: &TestParameters) -> Self {
        let mut groups = vec![DiceGroup::new(parameters.step().total(), None)];
        for (kind, spend) in parameters.resources() {
            for i in 1..=spend.points_used {
                groups.push(DiceGroup::new(
                    spend.step,
                    Some(format!("{} {i}", kind.label())),
                ));
            }
        }
        for (label, &step) in parameters.extra_dice() {
            groups.push(DiceGroup::new(step, Some(label.clone())));
        }
        Self { groups }
    }
}

impl fmt::Display for RollFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formula = self
            .groups
            .iter()
            .map(DiceGroup::formula)
            .collect::<Vec<_>>()
            .join("+");
        f.write_str(&formula)
    }
}

/// Every face shown by one exploding die, first roll included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DieRoll {
    pub faces: u32,
    pub results: Vec<u32>,
}

impl DieRoll {
    /// Rolls a die, rerolling and adding on its maximum face. Stops after
    /// `max_explosions` rerolls. A one-sided die never explodes.
    pub fn exploding(faces: u32, rng: &mut dyn DeterministicRng, max_explosions: u32) -> Self {
        let mut results = vec![rng.next_u32_range(1, faces)];
        if faces > 1 {
            let mut rerolls = 0;
            while results.last() == Some(&faces) && rerolls < max_explosions {
                results.push(rng.next_u32_range(1, faces));
                rerolls += 1;
            }
        }
        Self { faces, results }
    }

    #[must_use]
    pub fn total(&self) -> i32 {
        self.results
            .iter()
            .map(|&r| i32::try_from(r).unwrap_or(i32::MAX))
            .fold(0, i32::saturating_add)
    }

    #[must_use]
    pub fn exploded(&self) -> bool {
        self.results.len() > 1
    }
}

/// Evaluated dice group, kept for the tooltip breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupOutcome {
    pub label: Option<String>,
    pub step: i32,
    pub formula: String,
    pub dice: Vec<DieRoll>,
    pub modifier: i32,
    pub total: i32,
}

impl GroupOutcome {
    /// Faces rolled in this group, explosions included.
    #[must_use]
    pub fn num_faces(&self) -> usize {
        self.dice.iter().map(|d| d.results.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::config::RulesConfig;
    use crate::domain::data::TestData;
    use crate::domain::kinds::{TestContext, TestKind};
    use crate::domain::step_table::dice_formula;
    use crate::domain::step_value::{StepSource, TargetSource};
    use ed4e_test_support::{MockRng, SequenceRng};

    fn parameters(data: TestData) -> TestParameters {
        let data = TestData {
            step: Some(StepSource {
                base: 7,
                ..StepSource::default()
            }),
            target: Some(TargetSource::default()),
            ..data
        };
        TestParameters::from_context(&TestContext::new(data), &RulesConfig::default()).unwrap()
    }

    #[test]
    fn test_group_formula_marks_every_term_exploding() {
        assert_eq!(DiceGroup::new(7, None).formula(), "2d6x");
        assert_eq!(DiceGroup::new(0, None).formula(), "1d4x-2");
        assert_eq!(
            DiceGroup::new(8, Some("karma 1".to_owned())).formula(),
            "1d8x+1d6x[karma 1]"
        );
    }

    #[test]
    fn test_resource_points_add_one_labelled_group_each() {
        let params = parameters(TestData {
            karma: 3,
            karma_step: Some(4),
            ..TestData::new(TestKind::Arbitrary)
        });
        let formula = RollFormula::assemble(&params);

        assert_eq!(formula.groups.len(), 4);
        let labels: Vec<_> = formula.groups[1..]
            .iter()
            .map(|g| g.label.as_deref())
            .collect();
        assert_eq!(labels, [Some("karma 1"), Some("karma 2"), Some("karma 3")]);
        assert!(formula.groups[1..].iter().all(|g| g.dice().formula == dice_formula(4)));
    }

    #[test]
    fn test_zero_points_add_nothing() {
        let params = parameters(TestData::new(TestKind::Arbitrary));
        let formula = RollFormula::assemble(&params);
        assert_eq!(formula.groups, [DiceGroup::new(7, None)]);
        assert_eq!(formula.to_string(), "2d6x");
    }

    #[test]
    fn test_assembly_order_is_base_resources_extra() {
        let params = parameters(TestData {
            karma: 1,
            devotion: 1,
            karma_step: Some(3),
            devotion_step: Some(3),
            extra_dice: BTreeMap::from([("flame".to_owned(), 4)]),
            ..TestData::new(TestKind::Arbitrary)
        });
        let formula = RollFormula::assemble(&params);
        assert_eq!(
            formula.to_string(),
            "2d6x+1d6x[karma 1]+1d6x[devotion 1]+1d8x[flame]"
        );
    }

    #[test]
    fn test_die_explodes_on_maximum_face() {
        let mut rng = SequenceRng::new(vec![6, 6, 3]);
        let roll = DieRoll::exploding(6, &mut rng, 1000);
        assert_eq!(roll.results, [6, 6, 3]);
        assert_eq!(roll.total(), 15);
        assert!(roll.exploded());
    }

    #[test]
    fn test_explosions_are_capped() {
        let mut rng = SequenceRng::new(vec![4, 4, 4, 4]);
        let roll = DieRoll::exploding(4, &mut rng, 2);
        assert_eq!(roll.results.len(), 3);
        assert_eq!(rng.consumed(), 3);
    }

    #[test]
    fn test_group_total_includes_static_modifier() {
        let outcome = DiceGroup::new(0, None).roll(&mut MockRng, 1000);
        assert_eq!(outcome.total, -1);
        assert_eq!(outcome.num_faces(), 1);
        assert_eq!(outcome.formula, "1d4x-2");
    }
}
