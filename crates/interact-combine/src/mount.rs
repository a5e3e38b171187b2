//! Mount specifications: nested maps whose leaves are units

use crate::{Error, Result};
use indexmap::IndexMap;
use interact_core::{MountPath, Mountable, UnitId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// One entry of a [`MountSpec`]
#[derive(Clone)]
pub enum MountNode {
    /// A unit owning the slice at this key
    Unit(Arc<dyn Mountable>),
    /// A plain grouping of further entries
    Group(MountSpec),
}

/// A nested description of where each unit lives in the state tree
///
/// Groups carry no meaning beyond the keys they add to their children's
/// paths. Entries keep their insertion order, which is also the order units
/// see each dispatched action. Reusing a key replaces the earlier entry.
#[derive(Clone, Default)]
pub struct MountSpec {
    entries: IndexMap<String, MountNode>,
}

impl MountSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `unit` at `key`
    pub fn mount(mut self, key: impl Into<String>, unit: impl Mountable + 'static) -> Self {
        self.entries.insert(key.into(), MountNode::Unit(Arc::new(unit)));
        self
    }

    /// Nest `spec` under `key`
    pub fn group(mut self, key: impl Into<String>, spec: MountSpec) -> Self {
        self.entries.insert(key.into(), MountNode::Group(spec));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MountNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every unit with its path, depth first
    ///
    /// Nothing is mounted yet; this only validates keys and uniqueness.
    pub(crate) fn flatten(&self) -> Result<Vec<(MountPath, Arc<dyn Mountable>)>> {
        let mut out = Vec::new();
        let mut seen = HashMap::new();
        self.collect(&MountPath::root(), &mut out, &mut seen)?;
        Ok(out)
    }

    fn collect(
        &self,
        parent: &MountPath,
        out: &mut Vec<(MountPath, Arc<dyn Mountable>)>,
        seen: &mut HashMap<UnitId, MountPath>,
    ) -> Result<()> {
        for (key, node) in &self.entries {
            if key.is_empty() {
                return Err(Error::EmptyKey {
                    parent: parent.clone(),
                });
            }
            let path = parent.child(key.as_str());
            match node {
                MountNode::Unit(unit) => {
                    if let Some(first) = seen.get(&unit.unit_id()) {
                        return Err(Error::DuplicateMount {
                            class: unit.class_name().to_string(),
                            unit: unit.unit_id(),
                            first: first.clone(),
                            second: path,
                        });
                    }
                    seen.insert(unit.unit_id(), path.clone());
                    out.push((path, Arc::clone(unit)));
                }
                MountNode::Group(group) => group.collect(&path, out, seen)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for MountNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountNode::Unit(unit) => write!(f, "Unit({} {})", unit.class_name(), unit.unit_id()),
            MountNode::Group(spec) => spec.fmt(f),
        }
    }
}

impl fmt::Debug for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}
