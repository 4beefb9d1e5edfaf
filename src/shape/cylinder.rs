use nalgebra::Unit;

use super::{Shape, local_hit, misses_bounding_sphere};
use crate::geometry::{DOUBLE_ERROR, NEARLY_ZERO, Ray, WorldPoint, WorldVector};
use crate::intersection::Intersection;

/// Unit-radius cylinder around the local Y axis with caps at y = ±1.
/// The lateral surface is a quadratic on the XZ projection of the ray;
/// rays running almost parallel to the axis skip it and can only hit caps.
pub(super) fn intersect<'a>(
    shape: &'a Shape,
    local_ray: &Ray,
    include_behind: bool,
) -> Vec<Intersection<'a>> {
    if misses_bounding_sphere(local_ray, 3.0, include_behind) {
        return Vec::new();
    }

    let material = shape.material();
    let mut hits = Vec::new();

    let dx = local_ray.direction.x;
    let dz = local_ray.direction.z;
    let a = dx * dx + dz * dz;
    if a >= NEARLY_ZERO {
        let ox = local_ray.origin.x;
        let oz = local_ray.origin.z;
        let b = ox * dx + oz * dz;
        let c = ox * ox + oz * oz - 1.0;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let sqrt_discriminant = discriminant.sqrt();
            for t in [(-b - sqrt_discriminant) / a, (-b + sqrt_discriminant) / a] {
                if !include_behind && t <= NEARLY_ZERO {
                    continue;
                }
                let point = local_ray.point_at(t);
                if point.y.abs() <= 1.0 {
                    let normal = WorldVector::new(point.x, 0.0, point.z);
                    hits.push(local_hit(shape, local_ray, t, normal, material.clone(), material.clone()));
                }
            }
        }
    }

    let dy = local_ray.direction.y;
    if dy.abs() >= NEARLY_ZERO {
        for cap in [-1.0, 1.0] {
            let t = (cap - local_ray.origin.y) / dy;
            if !include_behind && t <= NEARLY_ZERO {
                continue;
            }
            let point = local_ray.point_at(t);
            if point.x * point.x + point.z * point.z <= 1.0 {
                let normal = WorldVector::new(0.0, cap, 0.0);
                hits.push(local_hit(shape, local_ray, t, normal, material.clone(), material.clone()));
            }
        }
    }

    hits
}

/// Cap normal near the end discs, radial direction elsewhere.
pub(super) fn normal_at(local_point: WorldPoint) -> Unit<WorldVector> {
    let radial = local_point.x.hypot(local_point.z);
    if local_point.y.abs() + DOUBLE_ERROR >= 1.0 && radial <= 1.0 {
        Unit::new_unchecked(WorldVector::new(0.0, local_point.y.signum(), 0.0))
    } else {
        Unit::try_new(WorldVector::new(local_point.x, 0.0, local_point.z), NEARLY_ZERO)
            .unwrap_or_else(WorldVector::y_axis)
    }
}
