use itertools::Itertools;

use super::Shape;
use crate::geometry::{DOUBLE_ERROR, Ray};
use crate::intersection::Intersection;

#[derive(Copy, Clone, Debug)]
pub(super) enum Operation {
    Union,
    Intersect,
    Difference,
}

/// Boundary hits sit exactly on a child's surface, so classifying them
/// against the other child needs a tolerance: the inclusive variant counts
/// the surface itself as inside, the strict one does not. This keeps
/// degenerate combinations like Difference(A, A) hitless.
fn inside_inclusive(shape: &Shape, hit: &Intersection) -> bool {
    shape.is_inside_with_margin(hit.point, DOUBLE_ERROR)
}

fn inside_strict(shape: &Shape, hit: &Intersection) -> bool {
    shape.is_inside_with_margin(hit.point, -DOUBLE_ERROR)
}

pub(super) fn intersect<'a>(
    operation: Operation,
    a: &'a Shape,
    b: &'a Shape,
    local_ray: &Ray,
    include_behind: bool,
) -> Vec<Intersection<'a>> {
    let a_hits = a.intersect(local_ray, include_behind, false);
    let b_hits = b.intersect(local_ray, include_behind, false);

    let (a_kept, b_kept): (Vec<_>, Vec<_>) = match operation {
        Operation::Union => (
            a_hits.into_iter().filter(|hit| !inside_strict(b, hit)).collect(),
            b_hits.into_iter().filter(|hit| !inside_strict(a, hit)).collect(),
        ),
        Operation::Intersect => (
            a_hits.into_iter().filter(|hit| inside_inclusive(b, hit)).collect(),
            b_hits.into_iter().filter(|hit| inside_inclusive(a, hit)).collect(),
        ),
        Operation::Difference => (
            a_hits.into_iter().filter(|hit| !inside_inclusive(b, hit)).collect(),
            b_hits
                .into_iter()
                .filter(|hit| inside_strict(a, hit))
                .map(Intersection::inverted)
                .collect(),
        ),
    };

    a_kept
        .into_iter()
        .merge_by(b_kept, |x, y| x.distance <= y.distance)
        .collect()
}
