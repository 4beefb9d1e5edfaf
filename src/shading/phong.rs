use nalgebra::Unit;

use crate::color::{BLACK, ColorExt};
use crate::geometry::{DOUBLE_ERROR, FloatType, Ray, WorldVector};
use crate::intersection::Intersection;
use crate::world::World;

use super::{LightingResult, first_hit};

/// Direct illumination: ambient, cosine-weighted diffuse and a specular
/// highlight per light, plus whatever the surface emits on its own.
pub(super) fn resolve(world: &World, ray: &Ray, hits: &[Intersection]) -> Option<LightingResult> {
    let hit = first_hit(hits)?;
    let surface = hit.diffuse_color();
    let mut radiance = BLACK;

    for light in &world.lights {
        let to_light = light.location() - hit.point;
        let shadow_ray = Ray::new(hit.point, to_light);

        // ambient ignores occlusion and orientation
        radiance += surface.modulate(light.ambient_at(&shadow_ray));

        if occluded(world, &shadow_ray, to_light.norm()) {
            continue;
        }
        let exposure = light.exposure(hit);
        if exposure <= 0.0 {
            continue;
        }

        radiance += surface.modulate(light.diffuse_at(&shadow_ray)) * exposure;

        let highlight = reflect(shadow_ray.direction.into_inner(), hit.normal).dot(&ray.direction);
        if highlight > 0.0 {
            radiance += hit
                .specular_color()
                .modulate(light.specular_at(&shadow_ray))
                * highlight.powf(hit.shininess());
        }
    }

    if let Some(emissive) = hit.emissive_color() {
        radiance += emissive;
    }

    Some(LightingResult::leaf(*ray, hit.point, hit.normal, radiance))
}

/// Anything solid strictly between the surface and the light. Transparent
/// shapes block too; shadows here are hard.
fn occluded(world: &World, shadow_ray: &Ray, light_distance: FloatType) -> bool {
    world
        .shape_intersections(shadow_ray)
        .iter()
        .any(|hit| hit.distance >= DOUBLE_ERROR && hit.distance < light_distance)
}

/// Mirror `vector` about `normal`.
pub(super) fn reflect(vector: WorldVector, normal: Unit<WorldVector>) -> WorldVector {
    vector - normal.into_inner() * (2.0 * vector.dot(&normal))
}
