use serde::{Deserialize, Serialize};

use crate::{coordinates::Coordinates, define_index_newtype};

define_index_newtype!(SlotIdx);
define_index_newtype!(TaskIdx);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationRole {
    Depot,
    Pickup,
    Delivery,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    coordinates: Coordinates,
    role: LocationRole,
}

impl Location {
    pub fn new(coordinates: Coordinates, role: LocationRole) -> Self {
        Location { coordinates, role }
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn role(&self) -> LocationRole {
        self.role
    }
}

impl From<&Location> for geo_types::Point {
    fn from(location: &Location) -> Self {
        (&location.coordinates).into()
    }
}

/// The ordered location list a routing request is built over.
///
/// Slot 0 is the depot; each delivery appends its pickup location followed by
/// its drop-off location, in input order. Task `2k` is delivery `k`'s pickup,
/// task `2k + 1` its drop-off, and a task's location slot is `task + 1`.
/// Built once per request and threaded through to result translation, so the
/// convention is defined here and nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationIndex {
    locations: Vec<Location>,
}

impl LocationIndex {
    pub const DEPOT_SLOT: SlotIdx = SlotIdx::new(0);

    pub fn with_depot(depot: Coordinates) -> Self {
        LocationIndex {
            locations: vec![Location::new(depot, LocationRole::Depot)],
        }
    }

    /// Appends one pickup/drop-off pair and returns the delivery's ordinal.
    pub fn push_pair(&mut self, pickup: Coordinates, dropoff: Coordinates) -> usize {
        let ordinal = self.pair_count();
        self.locations
            .push(Location::new(pickup, LocationRole::Pickup));
        self.locations
            .push(Location::new(dropoff, LocationRole::Delivery));
        ordinal
    }

    pub fn pair_count(&self) -> usize {
        (self.locations.len() - 1) / 2
    }

    pub fn task_count(&self) -> usize {
        self.locations.len() - 1
    }

    pub const fn pickup_task(ordinal: usize) -> TaskIdx {
        TaskIdx::new(ordinal * 2)
    }

    pub const fn delivery_task(ordinal: usize) -> TaskIdx {
        TaskIdx::new(ordinal * 2 + 1)
    }

    pub const fn task_slot(task: TaskIdx) -> SlotIdx {
        SlotIdx::new(task.get() + 1)
    }

    pub fn coordinates(&self, slot: SlotIdx) -> Option<Coordinates> {
        self.locations
            .get(slot.get())
            .map(|location| location.coordinates())
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
