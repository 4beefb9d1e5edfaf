use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use image::RgbaImage;
use nalgebra::Unit;

use crate::color::{BLACK, Color};
use crate::geometry::{FloatType, WorldVector};

type DirectionFn = Arc<dyn Fn(Unit<WorldVector>) -> Color + Send + Sync>;

#[derive(Clone)]
enum MapKind {
    /// Equirectangular image indexed by ray longitude and latitude.
    Spherical(Arc<RgbaImage>),
    Procedural(DirectionFn),
}

/// Backdrop for rays that leave the scene, sampled by direction alone.
#[derive(Clone)]
pub struct EnvironmentMap {
    kind: MapKind,
}

impl EnvironmentMap {
    pub fn spherical(image: RgbaImage) -> EnvironmentMap {
        EnvironmentMap {
            kind: MapKind::Spherical(Arc::new(image)),
        }
    }

    pub fn from_fn(sampler: impl Fn(Unit<WorldVector>) -> Color + Send + Sync + 'static) -> EnvironmentMap {
        EnvironmentMap {
            kind: MapKind::Procedural(Arc::new(sampler)),
        }
    }

    pub fn sample(&self, direction: Unit<WorldVector>) -> Color {
        match &self.kind {
            MapKind::Spherical(image) => sample_spherical(image, direction),
            MapKind::Procedural(sampler) => sampler(direction),
        }
    }
}

fn sample_spherical(image: &RgbaImage, direction: Unit<WorldVector>) -> Color {
    if image.width() == 0 || image.height() == 0 {
        return BLACK;
    }

    // -Z maps to the horizontal center, +Y to the top row
    let u = 0.5 + direction.x.atan2(-direction.z) / TAU;
    let v = 0.5 - direction.y.clamp(-1.0, 1.0).asin() / PI;

    let x = ((u * FloatType::from(image.width())) as u32).min(image.width() - 1);
    let y = ((v * FloatType::from(image.height())) as u32).min(image.height() - 1);

    let pixel = image.get_pixel(x, y).0;
    Color::new(
        FloatType::from(pixel[0]) / 255.0,
        FloatType::from(pixel[1]) / 255.0,
        FloatType::from(pixel[2]) / 255.0,
    )
}
