use nalgebra::Unit;

use super::{Shape, local_hit, misses_bounding_sphere};
use crate::geometry::{FloatType, NEARLY_ZERO, Ray, WorldPoint, WorldVector};
use crate::intersection::Intersection;

/// The [-1, 1]³ box, intersected slab by slab.
pub(super) fn intersect<'a>(
    shape: &'a Shape,
    local_ray: &Ray,
    include_behind: bool,
) -> Vec<Intersection<'a>> {
    if misses_bounding_sphere(local_ray, 3.0, include_behind) {
        return Vec::new();
    }

    let mut enter = FloatType::NEG_INFINITY;
    let mut exit = FloatType::INFINITY;
    for axis in 0..3 {
        let origin = local_ray.origin[axis];
        let direction = local_ray.direction[axis];
        if direction.abs() < NEARLY_ZERO {
            if origin.abs() > 1.0 {
                return Vec::new();
            }
            continue;
        }
        let t0 = (-1.0 - origin) / direction;
        let t1 = (1.0 - origin) / direction;
        let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        enter = enter.max(near);
        exit = exit.min(far);
    }
    if enter > exit {
        return Vec::new();
    }

    let material = shape.material();
    [enter, exit]
        .into_iter()
        .filter(|&t| include_behind || t > NEARLY_ZERO)
        .map(|t| {
            let normal = normal_at(local_ray.point_at(t)).into_inner();
            local_hit(shape, local_ray, t, normal, material.clone(), material.clone())
        })
        .collect()
}

/// Unit vector of the dominant axis of the local point.
pub(super) fn normal_at(local_point: WorldPoint) -> Unit<WorldVector> {
    let axis = local_point.coords.iamax();
    let mut normal = WorldVector::zeros();
    normal[axis] = local_point.coords[axis].signum();
    Unit::new_unchecked(normal)
}
