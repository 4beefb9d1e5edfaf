use std::sync::Arc;

use assert2::assert;
use nalgebra::Unit;

use crate::color::Color;
use crate::geometry::{FloatType, NEARLY_ZERO, Ray, WORLD_BOUND, WorldPoint, WorldVector};
use crate::intersection::Intersection;

type IntensityFn = Arc<dyn Fn(&Ray) -> Color + Send + Sync>;

#[derive(Copy, Clone, Debug)]
enum LightKind {
    Point { location: WorldPoint },
    /// Direction the light travels in; treated as a point source far away
    /// on the opposite side.
    Directional { direction: Unit<WorldVector> },
}

/// A light source. Intensities are functions of the shadow ray so sources
/// can vary by direction or distance.
#[derive(Clone)]
pub struct Light {
    kind: LightKind,
    ambient: IntensityFn,
    diffuse: IntensityFn,
    specular: IntensityFn,
}

impl Light {
    pub fn point(location: WorldPoint, ambient: Color, diffuse: Color, specular: Color) -> Light {
        Light {
            kind: LightKind::Point { location },
            ambient: Arc::new(move |_| ambient),
            diffuse: Arc::new(move |_| diffuse),
            specular: Arc::new(move |_| specular),
        }
    }

    pub fn directional(direction: WorldVector, ambient: Color, diffuse: Color, specular: Color) -> Light {
        assert!(direction.norm() > NEARLY_ZERO);
        Light {
            kind: LightKind::Directional {
                direction: Unit::new_normalize(direction),
            },
            ambient: Arc::new(move |_| ambient),
            diffuse: Arc::new(move |_| diffuse),
            specular: Arc::new(move |_| specular),
        }
    }

    pub fn with_ambient_fn(mut self, ambient: impl Fn(&Ray) -> Color + Send + Sync + 'static) -> Light {
        self.ambient = Arc::new(ambient);
        self
    }

    pub fn with_diffuse_fn(mut self, diffuse: impl Fn(&Ray) -> Color + Send + Sync + 'static) -> Light {
        self.diffuse = Arc::new(diffuse);
        self
    }

    pub fn with_specular_fn(mut self, specular: impl Fn(&Ray) -> Color + Send + Sync + 'static) -> Light {
        self.specular = Arc::new(specular);
        self
    }

    /// Where shadow rays are aimed.
    pub fn location(&self) -> WorldPoint {
        match self.kind {
            LightKind::Point { location } => location,
            LightKind::Directional { direction } => {
                WorldPoint::origin() - direction.into_inner() * WORLD_BOUND
            }
        }
    }

    pub fn ambient_at(&self, shadow_ray: &Ray) -> Color {
        (self.ambient)(shadow_ray)
    }

    pub fn diffuse_at(&self, shadow_ray: &Ray) -> Color {
        (self.diffuse)(shadow_ray)
    }

    pub fn specular_at(&self, shadow_ray: &Ray) -> Color {
        (self.specular)(shadow_ray)
    }

    /// Cosine of the angle between the surface normal and the direction
    /// to the light; zero or less means the surface faces away.
    pub fn exposure(&self, hit: &Intersection) -> FloatType {
        let to_light = self.location() - hit.point;
        match Unit::try_new(to_light, NEARLY_ZERO) {
            Some(direction) => direction.dot(&hit.normal),
            None => 0.0,
        }
    }
}
