use crate::snapshot::TargetSnapshot;
use crate::zone::DesiredSet;

/// What it takes to turn the current membership into the desired one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    /// Desired but not registered yet, with the reference ports.
    pub to_register: TargetSnapshot,

    /// Registered but no longer desired, ids only.
    pub to_deregister: TargetSnapshot,
}

impl Delta {
    /// Nothing to do, the destination already matches.
    pub fn is_empty(&self) -> bool {
        self.to_register.is_empty() && self.to_deregister.is_empty()
    }

    /// The membership `current` would have once this delta is applied.
    pub fn apply_to(&self, current: &TargetSnapshot) -> TargetSnapshot {
        current
            .iter()
            .filter(|target| !self.to_deregister.contains(&target.id))
            .chain(self.to_register.iter())
            .map(|target| target.without_port())
            .collect()
    }
}

/// Set difference by id in both directions.
///
/// Pure, so diffing unchanged snapshots again yields the same delta, and
/// diffing against the result of `Delta::apply_to` yields an empty one.
pub fn diff(desired: &DesiredSet, current: &TargetSnapshot) -> Delta {
    let to_register = desired
        .iter()
        .filter(|target| !current.contains(&target.id))
        .cloned()
        .collect();

    let to_deregister = current
        .iter()
        .filter(|target| !desired.contains(&target.id))
        .map(|target| target.without_port())
        .collect();

    Delta {
        to_register,
        to_deregister,
    }
}
