use super::{Shape, local_hit};
use crate::geometry::{NEARLY_ZERO, Ray, WorldVector};
use crate::intersection::Intersection;
use crate::material::Material;

/// The local XZ plane. Which material is entered depends on the side the
/// ray arrives from, not on air tagging like the closed primitives.
pub(super) fn intersect<'a>(
    shape: &'a Shape,
    plus: &Material,
    minus: &Material,
    local_ray: &Ray,
    include_behind: bool,
) -> Vec<Intersection<'a>> {
    let against_y = -local_ray.direction.y;
    if against_y.abs() < NEARLY_ZERO {
        return Vec::new();
    }
    let t = -local_ray.origin.y / local_ray.direction.y;
    if !include_behind && t <= NEARLY_ZERO {
        return Vec::new();
    }
    let (leaving, entering) = if against_y < 0.0 {
        (minus.clone(), plus.clone())
    } else {
        (plus.clone(), minus.clone())
    };
    vec![local_hit(shape, local_ray, t, WorldVector::y(), leaving, entering)]
}
