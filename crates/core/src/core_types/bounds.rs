//! Room geometry: the region in which fires may be placed.

use crate::core_types::rng::SimRng;
use crate::core_types::vec2::Vec2;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Rejection-sampling attempts for polygon rooms before giving up on a draw.
const POLYGON_SAMPLE_ATTEMPTS: usize = 32;

/// Legal spawn region of a room.
///
/// Rectangles are inclusive on every edge. Polygons use the even-odd rule and
/// must be simple (non self-intersecting); vertex order does not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoomBounds {
    /// Axis-aligned rectangle
    Rect {
        /// Lower-left corner
        min: Vec2,
        /// Upper-right corner
        max: Vec2,
    },
    /// Simple polygon
    Polygon {
        /// Outline vertices, implicitly closed
        vertices: Vec<Vec2>,
    },
}

impl RoomBounds {
    /// Rectangle spanning `min..=max`
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        RoomBounds::Rect { min, max }
    }

    /// Rectangle with its lower-left corner at the origin
    pub fn sized(width: f32, height: f32) -> Self {
        Self::rect(Vec2::zeros(), Vec2::new(width, height))
    }

    /// Polygon from an outline
    pub fn polygon(vertices: Vec<Vec2>) -> Self {
        RoomBounds::Polygon { vertices }
    }

    /// Axis-aligned bounding box `(min, max)`
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        match self {
            RoomBounds::Rect { min, max } => (*min, *max),
            RoomBounds::Polygon { vertices } => {
                let mut lo = Vec2::new(f32::INFINITY, f32::INFINITY);
                let mut hi = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
                for v in vertices {
                    lo = lo.inf(v);
                    hi = hi.sup(v);
                }
                (lo, hi)
            }
        }
    }

    /// Whether `p` lies inside the room
    pub fn contains(&self, p: Vec2) -> bool {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return false;
        }
        match self {
            RoomBounds::Rect { min, max } => {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            }
            RoomBounds::Polygon { vertices } => point_in_polygon(p, vertices),
        }
    }

    /// Uniformly sample a point inside the room.
    ///
    /// Returns `None` only for polygons when every rejection-sampling attempt
    /// landed outside the outline.
    pub fn sample(&self, rng: &mut SimRng) -> Option<Vec2> {
        let (lo, hi) = self.bounding_box();
        match self {
            RoomBounds::Rect { .. } => Some(Vec2::new(rng.range(lo.x, hi.x), rng.range(lo.y, hi.y))),
            RoomBounds::Polygon { .. } => (0..POLYGON_SAMPLE_ATTEMPTS)
                .map(|_| Vec2::new(rng.range(lo.x, hi.x), rng.range(lo.y, hi.y)))
                .find(|p| self.contains(*p)),
        }
    }

    /// Enclosed area in square units
    pub fn area(&self) -> f32 {
        match self {
            RoomBounds::Rect { min, max } => (max.x - min.x) * (max.y - min.y),
            RoomBounds::Polygon { vertices } => {
                let n = vertices.len();
                let twice: f32 = (0..n)
                    .map(|i| {
                        let a = vertices[i];
                        let b = vertices[(i + 1) % n];
                        a.x * b.y - b.x * a.y
                    })
                    .sum();
                twice.abs() * 0.5
            }
        }
    }

    /// Check the room encloses a finite, non-empty area.
    ///
    /// # Errors
    /// Returns [`ConfigError::DegenerateRoom`] for non-finite coordinates,
    /// inverted rectangles, polygons with fewer than three vertices, or zero area.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = |v: &Vec2| v.x.is_finite() && v.y.is_finite();
        match self {
            RoomBounds::Rect { min, max } => {
                if !finite(min) || !finite(max) {
                    return Err(ConfigError::DegenerateRoom(
                        "rectangle corners must be finite".to_string(),
                    ));
                }
                if max.x <= min.x || max.y <= min.y {
                    return Err(ConfigError::DegenerateRoom(format!(
                        "rectangle max ({}, {}) must exceed min ({}, {})",
                        max.x, max.y, min.x, min.y
                    )));
                }
            }
            RoomBounds::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(ConfigError::DegenerateRoom(format!(
                        "polygon needs at least 3 vertices, got {}",
                        vertices.len()
                    )));
                }
                if !vertices.iter().all(finite) {
                    return Err(ConfigError::DegenerateRoom(
                        "polygon vertices must be finite".to_string(),
                    ));
                }
                if self.area() <= f32::EPSILON {
                    return Err(ConfigError::DegenerateRoom(
                        "polygon encloses no area".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Even-odd ray cast along +x
fn point_in_polygon(p: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
