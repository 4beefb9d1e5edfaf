use super::{Shape, local_hit, misses_bounding_sphere};
use crate::geometry::{NEARLY_ZERO, Ray};
use crate::intersection::Intersection;

/// Unit sphere at the local origin, solved as a quadratic along the ray.
pub(super) fn intersect<'a>(
    shape: &'a Shape,
    local_ray: &Ray,
    include_behind: bool,
) -> Vec<Intersection<'a>> {
    if misses_bounding_sphere(local_ray, 1.0, include_behind) {
        return Vec::new();
    }

    let oc = local_ray.origin.coords;
    let b = oc.dot(&local_ray.direction);
    let c = oc.dot(&oc) - 1.0;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    let sqrt_discriminant = discriminant.sqrt();

    let material = shape.material();
    [-b - sqrt_discriminant, -b + sqrt_discriminant]
        .into_iter()
        .filter(|&t| include_behind || t > NEARLY_ZERO)
        .map(|t| {
            let normal = local_ray.point_at(t).coords;
            local_hit(shape, local_ray, t, normal, material.clone(), material.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Ray, WorldPoint, WorldVector};
    use crate::shape::Shape;
    use assert2::assert;

    #[test]
    fn axial_ray_enters_and_exits() {
        let sphere = Shape::sphere();
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));

        let hits = sphere.intersect(&ray, false, false);
        assert!(hits.len() == 2);

        assert!((hits[0].distance - 4.0).abs() < 1e-9);
        assert!((hits[0].point - WorldPoint::new(0.0, 0.0, -1.0)).norm() < 1e-9);
        assert!((hits[0].normal.into_inner() - WorldVector::new(0.0, 0.0, -1.0)).norm() < 1e-9);

        assert!((hits[1].distance - 6.0).abs() < 1e-9);
        assert!((hits[1].point - WorldPoint::new(0.0, 0.0, 1.0)).norm() < 1e-9);
        // exit normal is flipped to face the ray origin
        assert!((hits[1].normal.into_inner() - WorldVector::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn only_closest_returns_the_entry_hit() {
        let sphere = Shape::sphere();
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));

        let hits = sphere.intersect(&ray, false, true);
        assert!(hits.len() == 1);
        assert!((hits[0].distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn ray_from_inside_reports_the_exit() {
        let sphere = Shape::sphere();
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(1.0, 0.0, 0.0));

        let hits = sphere.intersect(&ray, false, false);
        assert!(hits.len() == 1);
        assert!((hits[0].distance - 1.0).abs() < 1e-9);
        assert!((hits[0].normal.into_inner() - WorldVector::new(-1.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn offset_ray_misses() {
        let sphere = Shape::sphere();
        let ray = Ray::new(WorldPoint::new(0.0, 2.0, -5.0), WorldVector::new(0.0, 0.0, 1.0));
        assert!(sphere.intersect(&ray, false, false).is_empty());
    }

    #[test]
    fn include_behind_sees_hits_past_the_origin() {
        let sphere = Shape::sphere();
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, 5.0), WorldVector::new(0.0, 0.0, 1.0));

        assert!(sphere.intersect(&ray, false, false).is_empty());

        let behind = sphere.intersect(&ray, true, false);
        assert!(behind.len() == 2);
        assert!((behind[0].distance + 6.0).abs() < 1e-9);
        assert!((behind[1].distance + 4.0).abs() < 1e-9);
    }

    #[test]
    fn is_inside_includes_the_boundary() {
        let sphere = Shape::sphere();
        assert!(sphere.is_inside(WorldPoint::origin()));
        assert!(sphere.is_inside(WorldPoint::new(1.0, 0.0, 0.0)));
        assert!(!sphere.is_inside(WorldPoint::new(1.001, 0.0, 0.0)));
    }
}
