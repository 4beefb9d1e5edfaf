use ordered_float::OrderedFloat;

use crate::camera::Camera;
use crate::geometry::Ray;
use crate::intersection::Intersection;
use crate::light::Light;
use crate::photon_map::PhotonMap;
use crate::shading::{LightingModel, LightingResult};
use crate::shape::Shape;

/// Everything a render needs: geometry, lights, camera and the shading
/// pipeline. Built up front, then shared read-only between workers.
#[derive(Clone)]
pub struct World {
    pub shapes: Vec<Shape>,
    pub lights: Vec<Light>,
    pub camera: Camera,
    pub lighting_model: LightingModel,
    /// Rays deeper than this resolve through the surface model only.
    pub max_ray_recursion: u32,
    pub photon_map: Option<PhotonMap>,
}

impl World {
    pub const DEFAULT_MAX_RAY_RECURSION: u32 = 4;

    pub fn new(camera: Camera) -> World {
        World {
            shapes: Vec::new(),
            lights: Vec::new(),
            camera,
            lighting_model: LightingModel::standard(),
            max_ray_recursion: Self::DEFAULT_MAX_RAY_RECURSION,
            photon_map: None,
        }
    }

    /// All surface crossings of the ray anywhere in the scene, ascending.
    pub fn shape_intersections(&self, ray: &Ray) -> Vec<Intersection<'_>> {
        let mut hits: Vec<_> = self
            .shapes
            .iter()
            .flat_map(|shape| shape.intersect(ray, false, false))
            .collect();
        hits.sort_by_key(|hit| OrderedFloat(hit.distance));
        hits
    }

    pub fn closest_shape_intersection(&self, ray: &Ray) -> Option<Intersection<'_>> {
        self.shapes
            .iter()
            .filter_map(|shape| shape.intersect(ray, false, true).into_iter().next())
            .min_by_key(|hit| OrderedFloat(hit.distance))
    }

    /// Runs the active lighting model on the ray. None means the ray left
    /// the scene without the pipeline supplying a color.
    pub fn shade(&self, ray: &Ray) -> Option<LightingResult> {
        let hits = self.shape_intersections(ray);
        self.lighting_model.resolve(self, ray, &hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::color_scheme::ColorScheme;
    use crate::geometry::{ScreenSize, WorldPoint, WorldVector};
    use crate::transform::Transform;
    use assert2::assert;

    fn test_world() -> World {
        World::new(Camera::builder().resolution(ScreenSize::new(10, 10)).build())
    }

    #[test]
    fn intersections_are_gathered_across_shapes() {
        let mut world = test_world();
        world.shapes.push(Shape::sphere().with_transform(Transform::translate(0.0, 0.0, 8.0)));
        world.shapes.push(Shape::sphere().with_transform(Transform::translate(0.0, 0.0, 4.0)));

        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let distances: Vec<_> = world.shape_intersections(&ray).iter().map(|h| h.distance).collect();

        assert!(distances.len() == 4);
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
        assert!((distances[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn closest_intersection_picks_the_nearest_shape() {
        let mut world = test_world();
        world.shapes.push(Shape::sphere().with_transform(Transform::translate(0.0, 0.0, 8.0)));
        world.shapes.push(Shape::sphere().with_transform(Transform::translate(0.0, 0.0, 4.0)));

        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let closest = world.closest_shape_intersection(&ray).unwrap();
        assert!((closest.distance - 3.0).abs() < 1e-9);
    }

    #[test]
    fn shade_of_an_empty_world_is_none() {
        let world = test_world();
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        assert!(world.shade(&ray).is_none());
    }

    #[test]
    fn flat_shading_returns_the_surface_color() {
        let mut world = test_world();
        world.lighting_model = LightingModel::Flat;
        world.shapes.push(
            Shape::sphere()
                .with_diffuse(ColorScheme::constant(Color::new(0.3, 0.6, 0.9)))
                .with_transform(Transform::translate(0.0, 0.0, 4.0)),
        );

        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let result = world.shade(&ray).unwrap();
        assert!(result.radiance == Color::new(0.3, 0.6, 0.9));
        assert!((result.point - WorldPoint::new(0.0, 0.0, 3.0)).norm() < 1e-9);
    }
}
