//! Static catalog of areas and their relocation destinations.
//!
//! Both are filled once at startup from a scene scan and never shrink
//! during a run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use warpzone_protocol::{AreaId, Vec3};

/// A registered waiting area.
///
/// Spatial bounds are not stored here. The core only ever asks the
/// [`Containment`](crate::Containment) collaborator whether a participant
/// is inside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Unique key.
    pub id: AreaId,
    /// Capacity while no countdown is running. Always at least 1.
    pub capacity: usize,
}

/// Every known area, in registration order.
///
/// Registration order is the order the coordinator refreshes and ticks
/// areas in.
#[derive(Debug, Clone)]
pub struct AreaRegistry {
    areas: Vec<Area>,
    index: HashMap<AreaId, usize>,
    default_capacity: usize,
}

impl AreaRegistry {
    /// Creates an empty registry. Areas registered without a capacity get
    /// `default_capacity`.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            areas: Vec::new(),
            index: HashMap::new(),
            default_capacity: default_capacity.max(1),
        }
    }

    /// Registers an area. Idempotent per name: registering a known name
    /// again leaves the original untouched and returns it.
    ///
    /// A capacity of `None` or `Some(0)` means "use the default".
    pub fn register(&mut self, id: impl Into<AreaId>, capacity: Option<usize>) -> &Area {
        let id = id.into();
        if let Some(&i) = self.index.get(&id) {
            tracing::debug!(area = %id, "area already registered");
            return &self.areas[i];
        }

        let capacity = match capacity {
            Some(0) => {
                tracing::warn!(area = %id, "zero capacity, using default");
                self.default_capacity
            }
            Some(c) => c,
            None => self.default_capacity,
        };

        tracing::info!(area = %id, capacity, "area registered");
        self.index.insert(id.clone(), self.areas.len());
        self.areas.push(Area { id, capacity });
        &self.areas[self.areas.len() - 1]
    }

    /// All areas in registration order.
    pub fn all(&self) -> &[Area] {
        &self.areas
    }

    pub fn get(&self, id: &AreaId) -> Option<&Area> {
        self.index.get(id).map(|&i| &self.areas[i])
    }

    pub fn contains(&self, id: &AreaId) -> bool {
        self.index.contains_key(id)
    }

    /// The area's registered capacity, or `None` for an unknown name.
    ///
    /// This is the idle capacity. While a countdown runs, the effective
    /// capacity is the captured party size instead; see
    /// [`AreaState::effective_capacity`](crate::AreaState::effective_capacity).
    pub fn capacity_of(&self, id: &AreaId) -> Option<usize> {
        self.get(id).map(|a| a.capacity)
    }

    pub fn default_capacity(&self) -> usize {
        self.default_capacity
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Where each area's group is sent when its countdown expires.
#[derive(Debug, Clone, Default)]
pub struct DestinationDirectory {
    targets: HashMap<AreaId, Vec3>,
}

impl DestinationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) an area's destination.
    pub fn insert(&mut self, area: impl Into<AreaId>, at: Vec3) {
        self.targets.insert(area.into(), at);
    }

    /// The destination for `area`, if one was registered.
    pub fn resolve(&self, area: &AreaId) -> Option<Vec3> {
        self.targets.get(area).copied()
    }
}
