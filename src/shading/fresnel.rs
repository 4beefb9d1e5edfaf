use nalgebra::Unit;

use crate::color::{BLACK, ColorExt};
use crate::geometry::{FAR_AWAY, FloatType, Ray, WorldVector};
use crate::intersection::Intersection;
use crate::world::World;

use super::phong::reflect;
use super::{LightingModel, LightingResult, first_hit};

/// Reflectance split and child rays at a refractive boundary, from the
/// polarization-averaged Fresnel equations.
struct Boundary {
    reflectance: FloatType,
    reflected: Ray,
    /// None under total internal reflection.
    refracted: Option<Ray>,
}

impl Boundary {
    fn at(hit: &Intersection) -> Boundary {
        let incident = hit.ray.direction.into_inner();
        let cos_incident = -incident.dot(&hit.normal);
        let n1 = hit.leaving.refractive_index_at(hit.point);
        let n2 = hit.entering.refractive_index_at(hit.point);
        let ratio = n1 / n2;

        let reflected = hit.ray.spawn_child(hit.point, reflect(incident, hit.normal));

        let sin2_transmitted = ratio * ratio * (1.0 - cos_incident * cos_incident);
        if sin2_transmitted > 1.0 {
            return Boundary {
                reflectance: 1.0,
                reflected,
                refracted: None,
            };
        }

        let cos_transmitted = (1.0 - sin2_transmitted).sqrt();
        let r_normal = ((n1 * cos_incident - n2 * cos_transmitted)
            / (n1 * cos_incident + n2 * cos_transmitted))
            .powi(2);
        let r_tangent = ((n2 * cos_incident - n1 * cos_transmitted)
            / (n2 * cos_incident + n1 * cos_transmitted))
            .powi(2);

        let bent = incident * ratio
            + hit.normal.into_inner() * (ratio * cos_incident - cos_transmitted);

        Boundary {
            reflectance: (r_normal + r_tangent) / 2.0,
            reflected,
            refracted: Some(hit.ray.spawn_child(hit.point, bent)),
        }
    }
}

/// Splits the ray at the boundary and blends: the refracted side is mixed
/// with the plain surface color by the surface's transparency, then the
/// whole is mixed with the reflected side by the Fresnel split. Rays past
/// the recursion allowance get the surface model alone.
pub(super) fn resolve(
    world: &World,
    surface: &LightingModel,
    ray: &Ray,
    hits: &[Intersection],
) -> Option<LightingResult> {
    if ray.depth > world.max_ray_recursion {
        return surface.resolve(world, ray, hits);
    }
    let hit = first_hit(hits)?;

    let boundary = Boundary::at(hit);
    let transmittance = 1.0 - boundary.reflectance;
    let transparency = hit.entering.transparency_at(hit.point);

    let surface_radiance = surface
        .resolve(world, ray, hits)
        .map_or(BLACK, |result| result.radiance);

    let mut contributions = Vec::new();
    let mut reflected_radiance = BLACK;
    if boundary.reflectance > 0.0 {
        let result = trace(world, boundary.reflected);
        reflected_radiance = result.radiance;
        contributions.push((result, boundary.reflectance));
    }
    let mut refracted_radiance = BLACK;
    if transmittance > 0.0 {
        if let Some(refracted) = boundary.refracted {
            let result = trace(world, refracted);
            refracted_radiance = result.radiance;
            contributions.push((result, transmittance * transparency));
        }
    }

    let through_surface = surface_radiance.lerp(refracted_radiance, transparency);
    let radiance = reflected_radiance.lerp(through_surface, transmittance);

    Some(LightingResult {
        eye: *ray,
        point: hit.point,
        normal: hit.normal,
        radiance,
        contributions,
    })
}

/// Missed child rays still produce a result, parked far outside the scene,
/// so blending and photon following treat hits and misses uniformly.
fn trace(world: &World, ray: Ray) -> LightingResult {
    world.shade(&ray).unwrap_or_else(|| {
        LightingResult::leaf(
            ray,
            ray.point_at(FAR_AWAY),
            Unit::new_unchecked(-ray.direction.into_inner()),
            BLACK,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::color::WHITE;
    use crate::geometry::{ScreenSize, WorldPoint};
    use crate::material::Material;
    use crate::shape::Shape;
    use crate::transform::Transform;
    use assert2::assert;
    use test_strategy::proptest;

    fn boundary_hit(shape: &Shape, n1: FloatType, n2: FloatType, angle: FloatType) -> Intersection<'_> {
        let direction = WorldVector::new(angle.sin(), -angle.cos(), 0.0);
        Intersection {
            shape,
            point: WorldPoint::origin(),
            local_point: WorldPoint::origin(),
            normal: WorldVector::y_axis(),
            ray: Ray::new(WorldPoint::new(0.0, 1.0, 0.0), direction),
            distance: 1.0,
            leaving: Material::constant(WHITE, 1.0, n1),
            entering: Material::constant(WHITE, 1.0, n2),
        }
    }

    #[proptest]
    fn boundary_split_conserves_energy(
        #[strategy(0.5..3.0f64)] n1: FloatType,
        #[strategy(0.5..3.0f64)] n2: FloatType,
        #[strategy(0.01..1.55f64)] angle: FloatType,
    ) {
        let shape = Shape::sphere();
        let boundary = Boundary::at(&boundary_hit(&shape, n1, n2, angle));

        assert!(0.0 <= boundary.reflectance && boundary.reflectance <= 1.0);

        let sin2_transmitted = (n1 / n2).powi(2) * angle.sin().powi(2);
        if sin2_transmitted > 1.0 {
            assert!(boundary.reflectance == 1.0);
            assert!(boundary.refracted.is_none());
        } else {
            assert!(boundary.refracted.is_some());
        }
    }

    #[test]
    fn steep_exit_from_glass_reflects_internally() {
        let shape = Shape::sphere();
        let angle = 60f64.to_radians();
        let boundary = Boundary::at(&boundary_hit(&shape, 1.5, 1.0, angle));

        assert!(boundary.reflectance == 1.0);
        assert!(boundary.refracted.is_none());
    }

    #[test]
    fn matched_media_pass_the_ray_straight_through() {
        let shape = Shape::sphere();
        let angle = 30f64.to_radians();
        let hit = boundary_hit(&shape, 1.3, 1.3, angle);
        let boundary = Boundary::at(&hit);

        assert!(boundary.reflectance < 1e-12);
        let refracted = boundary.refracted.unwrap();
        assert!((refracted.direction.into_inner() - hit.ray.direction.into_inner()).norm() < 1e-12);
    }

    #[test]
    fn glancing_blow_splits_into_mirror_and_snell_directions() {
        let glass = Material::constant(WHITE, 1.0, 1.5);
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(4, 4)).build());
        world.lighting_model = LightingModel::Fresnel {
            surface: Box::new(LightingModel::Flat),
        };
        // air above, glass below
        world.shapes.push(Shape::plane(Material::air(), glass));

        let ray = Ray::new(WorldPoint::new(-1.0, 1.0, 0.0), WorldVector::new(1.0, -1.0, 0.0));
        let result = world.shade(&ray).unwrap();
        assert!(result.contributions.len() == 2);

        let (reflected, reflected_share) = &result.contributions[0];
        assert!((reflected.eye.direction.into_inner() - WorldVector::new(1.0, 1.0, 0.0).normalize()).norm() < 1e-12);
        assert!(reflected.eye.depth == 2);
        assert!(0.0 < *reflected_share && *reflected_share < 1.0);

        let sin_transmitted = std::f64::consts::FRAC_1_SQRT_2 / 1.5;
        let expected = WorldVector::new(sin_transmitted, -(1.0 - sin_transmitted * sin_transmitted).sqrt(), 0.0);
        let (refracted, refracted_share) = &result.contributions[1];
        assert!((refracted.eye.direction.into_inner() - expected).norm() < 1e-9);
        assert!(refracted.eye.depth == 2);
        assert!(0.0 < *refracted_share && *refracted_share < 1.0);
    }

    #[test]
    fn spent_rays_fall_back_to_the_surface_model() {
        let glass = Material::constant(WHITE, 1.0, 1.5);
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(4, 4)).build());
        world.lighting_model = LightingModel::Fresnel {
            surface: Box::new(LightingModel::Phong),
        };
        world.shapes.push(Shape::sphere().with_material(glass));

        let spent = Ray {
            origin: WorldPoint::new(0.0, 0.0, -5.0),
            direction: Unit::new_normalize(WorldVector::new(0.0, 0.0, 1.0)),
            depth: world.max_ray_recursion + 1,
        };
        let result = world.shade(&spent).unwrap();
        assert!(result.contributions.is_empty());
    }

    fn deepest_ray(result: &LightingResult) -> u32 {
        result
            .contributions
            .iter()
            .map(|(child, _)| deepest_ray(child))
            .fold(result.eye.depth, u32::max)
    }

    #[test]
    fn recursion_stops_one_past_the_allowance() {
        // parallel part-mirroring planes would bounce rays forever
        let pane = || Shape::plane(Material::constant(WHITE, 1.0, 1.5), Material::air());
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(4, 4)).build());
        world.lighting_model = LightingModel::Fresnel {
            surface: Box::new(LightingModel::Phong),
        };
        world.max_ray_recursion = 3;
        world.shapes.push(pane());
        world.shapes.push(pane().with_transform(Transform::translate(0.0, 2.0, 0.0)));

        let ray = Ray::new(WorldPoint::new(0.0, 1.0, 0.0), WorldVector::new(0.0, 1.0, 0.0));
        let result = world.shade(&ray).unwrap();
        assert!(deepest_ray(&result) == world.max_ray_recursion + 1);
    }
}
