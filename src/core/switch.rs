//! Virtual on/off switches, one per period type.

use derive_more::Display;
use enumset::EnumSet;
use itertools::Itertools;

use crate::core::period::PeriodType;

#[must_use]
#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
#[display("{period} → {}", if *is_on { "ON" } else { "OFF" })]
pub struct Transition {
    pub period: PeriodType,
    pub is_on: bool,
}

#[must_use]
#[derive(Copy, Clone, Debug, Default)]
pub struct Switches {
    on: EnumSet<PeriodType>,
}

impl Switches {
    pub const fn on(&self) -> EnumSet<PeriodType> {
        self.on
    }

    /// Transitions needed to reach the target state.
    ///
    /// All switches get turned off before any gets turned on, so that two switches are never on
    /// at the same time. Within each phase, lower-priority switches go first.
    pub fn plan(&self, target: EnumSet<PeriodType>) -> Vec<Transition> {
        let turn_off = PeriodType::ascending_priority(self.on - target)
            .map(|period| Transition { period, is_on: false });
        let turn_on = PeriodType::ascending_priority(target - self.on)
            .map(|period| Transition { period, is_on: true });
        turn_off.chain(turn_on).collect_vec()
    }

    pub fn apply(&mut self, transition: Transition) {
        if transition.is_on {
            self.on.insert(transition.period);
        } else {
            self.on.remove(transition.period);
        }
    }
}
