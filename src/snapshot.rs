use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::remote::TargetHealthRecord;
use crate::{Error, Result};

/// A target registered, or to be registered, in a target group.
///
/// Identity is the `id` alone, `port` only travels along so registration can
/// reuse the port the reference group uses.
#[derive(Clone, Debug)]
pub struct TargetIdentity {
    pub id: String,
    pub port: Option<u16>,
}

impl TargetIdentity {
    pub fn new(id: impl Into<String>, port: Option<u16>) -> Self {
        TargetIdentity {
            id: id.into(),
            port,
        }
    }

    /// The same target without its port, as deregistration wants it.
    pub fn without_port(&self) -> Self {
        TargetIdentity {
            id: self.id.clone(),
            port: None,
        }
    }
}

impl PartialEq for TargetIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TargetIdentity {}

impl Hash for TargetIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialOrd for TargetIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TargetIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.id, port),
            None => f.write_str(&self.id),
        }
    }
}

/// A point-in-time set of targets, unique by id.
///
/// Backed by an ordered map, so iteration (and therefore logs and API
/// parameters) is sorted by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetSnapshot {
    targets: BTreeMap<String, TargetIdentity>,
}

impl TargetSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the target unless one with the same id is present already,
    /// returns whether it was inserted.
    fn insert(&mut self, target: TargetIdentity) -> bool {
        if self.targets.contains_key(&target.id) {
            return false;
        }

        self.targets.insert(target.id.clone(), target);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.targets.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TargetIdentity> {
        self.targets.get(id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetIdentity> {
        self.targets.values()
    }

    pub fn ids(&self) -> Vec<String> {
        self.targets.keys().cloned().collect()
    }

    pub fn to_vec(&self) -> Vec<TargetIdentity> {
        self.targets.values().cloned().collect()
    }

    /// Same ids in both snapshots, ports are not compared.
    pub fn same_ids(&self, other: &TargetSnapshot) -> bool {
        self.targets.keys().eq(other.targets.keys())
    }
}

/// The first target with a given id wins.
impl FromIterator<TargetIdentity> for TargetSnapshot {
    fn from_iter<T: IntoIterator<Item = TargetIdentity>>(iter: T) -> Self {
        let mut snapshot = TargetSnapshot::new();
        for target in iter {
            snapshot.insert(target);
        }

        snapshot
    }
}

impl fmt::Display for TargetSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (index, target) in self.targets.values().enumerate() {
            if index != 0 {
                f.write_str(", ")?;
            }
            target.fmt(f)?;
        }
        f.write_str("]")
    }
}

/// Build a snapshot from the target health of a group.
///
/// Ports are dropped unless `include_port`, the destination group only needs
/// ids while the reference group supplies the ports to register with.
pub fn build_snapshot(
    records: &[TargetHealthRecord],
    include_port: bool,
) -> Result<TargetSnapshot> {
    let mut snapshot = TargetSnapshot::new();

    for (index, record) in records.iter().enumerate() {
        let id = match record.id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(Error::malformed(format!(
                    "target health description #{index} has no target id"
                )));
            }
        };

        let port = if include_port { record.port } else { None };
        if !snapshot.insert(TargetIdentity::new(id, port)) {
            debug!(
                message = "duplicate target in health descriptions",
                id,
                port = ?record.port,
            );
        }
    }

    Ok(snapshot)
}
