use std::collections::BTreeMap;

use crate::remote::InstanceStatusRecord;
use crate::snapshot::TargetSnapshot;
use crate::{Error, Result};

/// The reference snapshot restricted to the configured availability zone.
pub type DesiredSet = TargetSnapshot;

/// Instance id to availability zone, as reported by the instance status API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstanceZoneMap {
    zones: BTreeMap<String, String>,
}

impl InstanceZoneMap {
    pub fn from_statuses(records: &[InstanceStatusRecord]) -> Result<Self> {
        let mut zones = BTreeMap::new();

        for (index, record) in records.iter().enumerate() {
            let Some(id) = record.instance_id.as_deref().filter(|id| !id.is_empty()) else {
                return Err(Error::malformed(format!(
                    "instance status #{index} has no instance id"
                )));
            };
            let Some(zone) = record.availability_zone.as_deref().filter(|z| !z.is_empty()) else {
                return Err(Error::malformed(format!(
                    "instance status of {id} has no availability zone"
                )));
            };

            zones.entry(id.to_string()).or_insert_with(|| zone.to_string());
        }

        Ok(InstanceZoneMap { zones })
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.zones.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InstanceZoneMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        InstanceZoneMap {
            zones: iter
                .into_iter()
                .map(|(id, zone)| (id.into(), zone.into()))
                .collect(),
        }
    }
}

/// Keep the targets whose instance is known to live in `zone`.
///
/// An instance missing from `zones`, terminated between the two fetches for
/// example, is left out: a target is never registered unless its zone was
/// confirmed.
pub fn filter_by_zone(
    reference: &TargetSnapshot,
    zones: &InstanceZoneMap,
    zone: &str,
) -> DesiredSet {
    let desired = reference
        .iter()
        .filter(|target| match zones.get(&target.id) {
            Some(got) => got == zone,
            None => {
                debug!(
                    message = "zone of instance unknown, skipping",
                    id = %target.id,
                );
                false
            }
        })
        .cloned()
        .collect::<DesiredSet>();

    if desired.is_empty() {
        info!(message = "no instances found in zone", zone);
    } else {
        info!(
            message = "found instances in zone",
            zone,
            count = desired.len(),
            targets = %desired,
        );
    }

    desired
}
