//! Vector type alias for 2D room positions.

use nalgebra::Vector2;

/// 2D vector type for positions inside the room.
///
/// This is a simple alias for `nalgebra::Vector2<f32>`, used throughout
/// the simulation for fire positions, spawn points and water hit locations.
pub type Vec2 = Vector2<f32>;
