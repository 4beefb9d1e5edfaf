use std::sync::Arc;

use crate::color::{Color, WHITE};
use crate::color_scheme::PointFn;
use crate::geometry::{FloatType, WorldPoint};

/// Volume properties of the medium behind a surface, indexed by the
/// shape-local hit point.
#[derive(Clone)]
pub struct Material {
    color: PointFn<Color>,
    transparency: PointFn<FloatType>,
    refractive_index: PointFn<FloatType>,
}

impl Material {
    pub fn new(
        color: impl Fn(WorldPoint) -> Color + Send + Sync + 'static,
        transparency: impl Fn(WorldPoint) -> FloatType + Send + Sync + 'static,
        refractive_index: impl Fn(WorldPoint) -> FloatType + Send + Sync + 'static,
    ) -> Material {
        Material {
            color: Arc::new(color),
            transparency: Arc::new(transparency),
            refractive_index: Arc::new(refractive_index),
        }
    }

    pub fn constant(color: Color, transparency: FloatType, refractive_index: FloatType) -> Material {
        Material::new(move |_| color, move |_| transparency, move |_| refractive_index)
    }

    pub fn opaque(color: Color) -> Material {
        Material::constant(color, 0.0, 1.0)
    }

    /// The medium rays travel through by default: fully transparent, index 1.
    pub fn air() -> Material {
        Material::constant(WHITE, 1.0, 1.0)
    }

    pub fn color_at(&self, point: WorldPoint) -> Color {
        (self.color)(point)
    }

    pub fn transparency_at(&self, point: WorldPoint) -> FloatType {
        (self.transparency)(point)
    }

    pub fn refractive_index_at(&self, point: WorldPoint) -> FloatType {
        (self.refractive_index)(point)
    }
}

impl Default for Material {
    fn default() -> Material {
        Material::air()
    }
}
