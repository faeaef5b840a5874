//! Core types and utilities

pub mod bounds;
pub mod rng;
pub mod spatial;
pub(crate) mod timer;
pub mod vec2;

pub use bounds::RoomBounds;
pub use rng::SimRng;
pub use spatial::SpatialIndex;
pub use vec2::Vec2;
