use std::sync::Arc;

use crate::color::Color;
use crate::geometry::{FloatType, WorldPoint};

pub(crate) type PointFn<T> = Arc<dyn Fn(WorldPoint) -> T + Send + Sync>;

/// Surface color as a function of the shape-local hit point,
/// plus the Phong specular exponent.
#[derive(Clone)]
pub struct ColorScheme {
    color: PointFn<Color>,
    shininess: FloatType,
}

impl ColorScheme {
    pub const DEFAULT_SHININESS: FloatType = 30.0;

    pub fn constant(color: Color) -> ColorScheme {
        ColorScheme::from_fn(move |_| color)
    }

    pub fn from_fn(color: impl Fn(WorldPoint) -> Color + Send + Sync + 'static) -> ColorScheme {
        ColorScheme {
            color: Arc::new(color),
            shininess: Self::DEFAULT_SHININESS,
        }
    }

    pub fn checkerboard(even: Color, odd: Color, square_size: FloatType) -> ColorScheme {
        ColorScheme::from_fn(checkerboard(even, odd, square_size))
    }

    pub fn with_shininess(mut self, shininess: FloatType) -> ColorScheme {
        self.shininess = shininess;
        self
    }

    pub fn color_at(&self, point: WorldPoint) -> Color {
        (self.color)(point)
    }

    pub fn shininess(&self) -> FloatType {
        self.shininess
    }
}

/// Axis-aligned 3d checkerboard pattern with cells of the given size.
fn checkerboard(
    even: Color,
    odd: Color,
    square_size: FloatType,
) -> impl Fn(WorldPoint) -> Color + Send + Sync {
    move |point: WorldPoint| {
        let cell: i64 = point
            .coords
            .iter()
            .map(|c| (c / square_size).floor() as i64)
            .sum();
        if cell.rem_euclid(2) == 0 { even } else { odd }
    }
}
