use indexmap::IndexMap;
use tracing::warn;

use roompla_api::Room;

/// Rooms keyed by id, in the order the server listed them.
///
/// Never merged: every listing replaces the whole map. A repeated id keeps
/// the position of its first occurrence and the value of its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMap {
    by_id: IndexMap<String, Room>,
}

impl RoomMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a room listing. Rooms without an id cannot be
    /// addressed and are skipped.
    pub fn from_rooms(rooms: impl IntoIterator<Item = Room>) -> Self {
        let mut by_id = IndexMap::new();
        let mut skipped = 0usize;
        for room in rooms {
            match room.id.clone() {
                Some(id) => {
                    by_id.insert(id, room);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(skipped, "ignoring rooms without an id");
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Room> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.by_id.keys().map(String::as_str)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.by_id.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Room)> {
        self.by_id.iter().map(|(id, room)| (id.as_str(), room))
    }
}

impl FromIterator<Room> for RoomMap {
    fn from_iter<I: IntoIterator<Item = Room>>(iter: I) -> Self {
        Self::from_rooms(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn room(id: Option<&str>, max: Option<u32>) -> Room {
        Room {
            id: id.map(Into::into),
            max_occupancy: max,
        }
    }

    #[test]
    fn skips_rooms_without_id() {
        let map = RoomMap::from_rooms([room(Some("A"), Some(2)), room(None, Some(5)), room(Some("B"), None)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.ids().collect::<Vec<_>>(), ["A", "B"]);
    }

    #[test]
    fn keeps_listing_order() {
        let map: RoomMap = [room(Some("C"), None), room(Some("A"), None), room(Some("B"), None)]
            .into_iter()
            .collect();
        assert_eq!(map.ids().collect::<Vec<_>>(), ["C", "A", "B"]);
    }

    #[test]
    fn duplicate_id_keeps_first_position_and_last_value() {
        let map = RoomMap::from_rooms([
            room(Some("A"), Some(1)),
            room(Some("B"), Some(2)),
            room(Some("A"), Some(3)),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.ids().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(map.get("A").unwrap().max_occupancy, Some(3));
    }

    #[test]
    fn empty_listing_gives_empty_map() {
        let map = RoomMap::from_rooms(Vec::new());
        assert!(map.is_empty());
        assert!(!map.contains("A"));
    }

    #[test]
    fn iter_pairs_ids_with_rooms() {
        let map = RoomMap::from_rooms([room(Some("A"), Some(4))]);
        let pairs: Vec<_> = map.iter().map(|(id, r)| (id, r.max_occupancy)).collect();
        assert_eq!(pairs, [("A", Some(4))]);
    }
}
