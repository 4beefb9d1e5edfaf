use std::iter::FusedIterator;

use nalgebra::Unit;

pub type FloatType = f64;

/// Cutoff below which a direction component or vector norm is treated as zero.
pub const NEARLY_ZERO: FloatType = 1e-11;

/// Tolerance for comparing distances between intersections.
/// Also the default gather radius of the photon map.
pub const DOUBLE_ERROR: FloatType = 1e-5;

/// Radius of the sphere around the world origin that contains the whole scene.
/// Photons that wander past it are dropped.
pub const WORLD_BOUND: FloatType = 1e4;

/// Stand-in for an infinite distance: fully fogged misses, plane sampling extent.
pub const FAR_AWAY: FloatType = 1e6;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: Unit<WorldVector>,
    /// Number of surface interactions this ray is removed from its source.
    /// Camera and photon rays start at 1.
    pub depth: u32,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: Unit::new_normalize(direction),
            depth: 1,
        }
    }

    /// A ray continuing from a surface interaction of `self`, one level deeper.
    pub fn spawn_child(&self, origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: Unit::new_normalize(direction),
            depth: self.depth + 1,
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }
}

/// Axis-aligned rectangle of pixels. `max` is exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScreenBlock {
    pub min: ScreenPoint,
    pub max: ScreenPoint,
}

impl ScreenBlock {
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> ScreenBlock {
        ScreenBlock { min, max }
    }

    pub fn from_size(size: ScreenSize) -> ScreenBlock {
        ScreenBlock {
            min: ScreenPoint::origin(),
            max: ScreenPoint::origin() + size,
        }
    }

    pub fn width(&self) -> u32 {
        self.max.x.saturating_sub(self.min.x)
    }

    pub fn height(&self) -> u32 {
        self.max.y.saturating_sub(self.min.y)
    }

    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }

    /// Iterator over pixel coordinates inside the block,
    /// in C order (x changes first, then y).
    pub fn internal_points(&self) -> InternalPoints {
        if self.is_empty() {
            InternalPoints::empty()
        } else {
            InternalPoints {
                min_x: self.min.x,
                max: self.max,

                cursor: self.min,
            }
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InternalPoints {
    min_x: u32,
    max: ScreenPoint,

    cursor: ScreenPoint,
}

impl InternalPoints {
    fn empty() -> Self {
        InternalPoints {
            min_x: 1,
            max: ScreenPoint::origin(),

            cursor: ScreenPoint::origin(),
        }
    }
}

impl Iterator for InternalPoints {
    type Item = ScreenPoint;

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.y >= self.max.y {
            return None;
        }

        let ret = self.cursor;

        debug_assert!(self.cursor.x < self.max.x);
        self.cursor.x += 1;
        if self.cursor.x >= self.max.x {
            self.cursor.x = self.min_x;
            self.cursor.y += 1;
        }

        Some(ret)
    }
}

impl ExactSizeIterator for InternalPoints {
    fn len(&self) -> usize {
        if self.cursor.y >= self.max.y {
            0
        } else {
            let row_width = (self.max.x - self.min_x) as usize;
            let whole_rows = (self.max.y - self.cursor.y - 1) as usize * row_width;
            let current_row = (self.max.x - self.cursor.x) as usize;
            whole_rows + current_row
        }
    }
}

impl FusedIterator for InternalPoints {}
