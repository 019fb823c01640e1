// ── Room lookup table ──
//
// Id-keyed room storage, rebuilt wholesale from each listing.

mod room_map;

pub use room_map::RoomMap;
