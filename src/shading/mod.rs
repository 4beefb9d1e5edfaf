mod environment;
mod fresnel;
mod phong;

use nalgebra::Unit;

pub use environment::EnvironmentMap;

use crate::color::Color;
use crate::geometry::{DOUBLE_ERROR, FAR_AWAY, FloatType, Ray, WorldPoint, WorldVector};
use crate::intersection::Intersection;
use crate::world::World;

/// One stage of the shading pipeline. Wrapping stages hold their inner
/// stage, so a whole pipeline is a single value resolved front to back.
#[derive(Clone)]
pub enum LightingModel {
    /// Surface color only, no lights.
    Flat,
    /// Emissive scheme of the hit shape, or nothing.
    Emissive,
    /// Direct illumination with shadows.
    Phong,
    /// Reflection and refraction splitting; `surface` shades the boundary
    /// itself and takes over when the recursion allowance runs out.
    Fresnel { surface: Box<LightingModel> },
    /// Exponential decay toward a fog color with distance.
    Fog {
        half_distance: FloatType,
        color: Color,
        inner: Box<LightingModel>,
    },
    /// Background color for rays that leave the scene.
    EnvironmentMap {
        map: EnvironmentMap,
        inner: Box<LightingModel>,
    },
    /// Dispatches on the entered material: see-through surfaces get the
    /// transmissive chain, the rest the opaque one.
    MaterialAware {
        transmissive: Box<LightingModel>,
        opaque: Box<LightingModel>,
    },
    /// Adds the photon map estimate around the hit point.
    PhotonGather {
        radius: FloatType,
        inner: Box<LightingModel>,
    },
}

/// What a pipeline stage produced for one ray: the radiance plus the
/// recursive results it was blended from, weighted by their share.
/// The photon tracer walks these branches.
#[derive(Clone, Debug)]
pub struct LightingResult {
    /// The ray this result answers.
    pub eye: Ray,
    pub point: WorldPoint,
    pub normal: Unit<WorldVector>,
    pub radiance: Color,
    pub contributions: Vec<(LightingResult, FloatType)>,
}

impl LightingResult {
    pub fn leaf(eye: Ray, point: WorldPoint, normal: Unit<WorldVector>, radiance: Color) -> LightingResult {
        LightingResult {
            eye,
            point,
            normal,
            radiance,
            contributions: Vec::new(),
        }
    }
}

/// The first hit that is usably far in front of the ray origin.
fn first_hit<'h, 'a>(hits: &'h [Intersection<'a>]) -> Option<&'h Intersection<'a>> {
    hits.iter().find(|hit| hit.distance >= DOUBLE_ERROR)
}

impl LightingModel {
    /// Phong everywhere, with Fresnel splitting on see-through materials.
    pub fn standard() -> LightingModel {
        LightingModel::MaterialAware {
            transmissive: Box::new(LightingModel::Fresnel {
                surface: Box::new(LightingModel::Phong),
            }),
            opaque: Box::new(LightingModel::Phong),
        }
    }

    pub fn with_fog(self, half_distance: FloatType, color: Color) -> LightingModel {
        LightingModel::Fog {
            half_distance,
            color,
            inner: Box::new(self),
        }
    }

    pub fn with_environment(self, map: EnvironmentMap) -> LightingModel {
        LightingModel::EnvironmentMap {
            map,
            inner: Box::new(self),
        }
    }

    /// `PhotonMap::DEFAULT_RADIUS` is the usual gather radius.
    pub fn with_photon_gather(self, radius: FloatType) -> LightingModel {
        LightingModel::PhotonGather {
            radius,
            inner: Box::new(self),
        }
    }

    /// Shades `ray` given all its intersections with the world, sorted.
    /// None bubbles up when no stage has a color for the ray.
    pub fn resolve(&self, world: &World, ray: &Ray, hits: &[Intersection]) -> Option<LightingResult> {
        match self {
            LightingModel::Flat => {
                let hit = first_hit(hits)?;
                Some(LightingResult::leaf(*ray, hit.point, hit.normal, hit.diffuse_color()))
            }
            LightingModel::Emissive => {
                let hit = first_hit(hits)?;
                let radiance = hit.emissive_color()?;
                Some(LightingResult::leaf(*ray, hit.point, hit.normal, radiance))
            }
            LightingModel::Phong => phong::resolve(world, ray, hits),
            LightingModel::Fresnel { surface } => fresnel::resolve(world, surface, ray, hits),
            LightingModel::Fog {
                half_distance,
                color,
                inner,
            } => Some(fogged(world, *half_distance, *color, inner, ray, hits)),
            LightingModel::EnvironmentMap { map, inner } => {
                if let Some(result) = inner.resolve(world, ray, hits) {
                    return Some(result);
                }
                if first_hit(hits).is_some() {
                    return None;
                }
                Some(LightingResult::leaf(
                    *ray,
                    ray.point_at(FAR_AWAY),
                    Unit::new_unchecked(-ray.direction.into_inner()),
                    map.sample(ray.direction),
                ))
            }
            LightingModel::MaterialAware { transmissive, opaque } => {
                let model = match first_hit(hits) {
                    Some(hit) if hit.entering.transparency_at(hit.point) > 0.0 => transmissive,
                    _ => opaque,
                };
                model.resolve(world, ray, hits)
            }
            LightingModel::PhotonGather { radius, inner } => {
                let mut result = inner.resolve(world, ray, hits)?;
                if let (Some(hit), Some(map)) = (first_hit(hits), world.photon_map.as_ref()) {
                    result.radiance += map.radiance_at(hit.point, *radius);
                }
                Some(result)
            }
        }
    }
}

/// Fog produces a result even for rays that leave the scene; those count
/// as fully fogged at FAR_AWAY.
fn fogged(
    world: &World,
    half_distance: FloatType,
    color: Color,
    inner: &LightingModel,
    ray: &Ray,
    hits: &[Intersection],
) -> LightingResult {
    let distance = first_hit(hits).map_or(FAR_AWAY, |hit| hit.distance);
    let strength = 0.5f64.powf(distance / half_distance);

    match inner.resolve(world, ray, hits) {
        Some(result) => LightingResult {
            radiance: result.radiance * strength + color * (1.0 - strength),
            ..result
        },
        None => LightingResult::leaf(
            *ray,
            ray.point_at(FAR_AWAY),
            Unit::new_unchecked(-ray.direction.into_inner()),
            color * (1.0 - strength),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::color::{BLACK, WHITE};
    use crate::color_scheme::ColorScheme;
    use crate::geometry::ScreenSize;
    use crate::material::Material;
    use crate::shape::Shape;
    use crate::transform::Transform;
    use assert2::assert;

    fn empty_world(model: LightingModel) -> World {
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(4, 4)).build());
        world.lighting_model = model;
        world
    }

    fn probe() -> Ray {
        Ray::new(WorldPoint::new(0.0, 0.0, -5.0), crate::geometry::WorldVector::new(0.0, 0.0, 1.0))
    }

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-9 && (a.g - b.g).abs() < 1e-9 && (a.b - b.b).abs() < 1e-9
    }

    #[test]
    fn emissive_stage_needs_an_emissive_scheme() {
        let mut world = empty_world(LightingModel::Emissive);
        world.shapes.push(Shape::sphere());
        assert!(world.shade(&probe()).is_none());

        world.shapes[0] = Shape::sphere().with_emissive(ColorScheme::constant(Color::new(2.0, 1.0, 0.5)));
        let result = world.shade(&probe()).unwrap();
        assert!(result.radiance == Color::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn material_aware_dispatches_on_transparency() {
        let transparent_says = LightingModel::Flat;
        let opaque_says = LightingModel::Emissive;
        let model = LightingModel::MaterialAware {
            transmissive: Box::new(transparent_says),
            opaque: Box::new(opaque_says),
        };

        let mut world = empty_world(model);
        world.shapes.push(
            Shape::sphere()
                .with_diffuse(ColorScheme::constant(Color::new(0.1, 0.2, 0.3)))
                .with_material(Material::constant(WHITE, 0.5, 1.2)),
        );

        // see-through: the flat chain answers with the diffuse color
        let result = world.shade(&probe()).unwrap();
        assert!(result.radiance == Color::new(0.1, 0.2, 0.3));

        // opaque: the emissive chain has nothing to say
        world.shapes[0] = Shape::sphere().with_material(Material::opaque(WHITE));
        assert!(world.shade(&probe()).is_none());
    }

    #[test]
    fn fog_blends_toward_its_color_with_distance() {
        let fog_color = Color::new(0.5, 0.5, 0.5);
        // the sphere surface sits 4 units away; half_distance 4 halves the signal
        let model = LightingModel::Flat.with_fog(4.0, fog_color);
        let mut world = empty_world(model);
        world.shapes.push(Shape::sphere().with_diffuse(ColorScheme::constant(WHITE)));

        let result = world.shade(&probe()).unwrap();
        assert!(close(result.radiance, Color::new(0.75, 0.75, 0.75)));
    }

    #[test]
    fn fog_swallows_rays_that_leave_the_scene() {
        let fog_color = Color::new(0.5, 0.6, 0.7);
        let world = empty_world(LightingModel::Flat.with_fog(10.0, fog_color));

        let result = world.shade(&probe()).unwrap();
        assert!(close(result.radiance, fog_color));
    }

    #[test]
    fn environment_supplies_missed_rays() {
        let map = EnvironmentMap::from_fn(|direction| {
            if direction.z > 0.0 { Color::new(0.0, 1.0, 0.0) } else { BLACK }
        });
        let world = empty_world(LightingModel::Flat.with_environment(map));

        let result = world.shade(&probe()).unwrap();
        assert!(result.radiance == Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn environment_does_not_override_hits() {
        let map = EnvironmentMap::from_fn(|_| Color::new(0.0, 1.0, 0.0));
        let mut world = empty_world(LightingModel::Flat.with_environment(map));
        world.shapes.push(Shape::sphere().with_diffuse(ColorScheme::constant(Color::new(1.0, 0.0, 0.0))));

        let result = world.shade(&probe()).unwrap();
        assert!(result.radiance == Color::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn photon_gather_without_a_map_is_the_inner_result() {
        let model = LightingModel::Flat.with_photon_gather(0.25);
        let mut world = empty_world(model);
        world.shapes.push(Shape::sphere().with_diffuse(ColorScheme::constant(Color::new(0.2, 0.2, 0.2))));

        let result = world.shade(&probe()).unwrap();
        assert!(result.radiance == Color::new(0.2, 0.2, 0.2));
    }

    #[test]
    fn standard_pipeline_shades_an_opaque_scene_directly() {
        let mut world = empty_world(LightingModel::standard());
        world.shapes.push(Shape::cube().with_transform(Transform::translate(0.0, 0.0, 3.0)));
        world.lights.push(crate::light::Light::point(
            WorldPoint::new(0.0, 0.0, -10.0),
            BLACK,
            WHITE,
            BLACK,
        ));

        let result = world.shade(&probe()).unwrap();
        // head-on light, white surface: full diffuse exposure
        assert!(close(result.radiance, WHITE));
        assert!(result.contributions.is_empty());
    }
}
