use std::f64::consts::PI;

use nalgebra::Unit;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, UnitSphere};

use crate::color::{BLACK, Color};
use crate::geometry::{
    DOUBLE_ERROR, FloatType, NEARLY_ZERO, Ray, WORLD_BOUND, WorldPoint, WorldVector,
};
use crate::light::Light;
use crate::shading::LightingResult;
use crate::shape::Shape;
use crate::world::World;

/// How many times one photon may be re-aimed before it is dropped.
const MAX_AIM_ATTEMPTS: u32 = 32;

#[derive(Copy, Clone, Debug)]
struct Photon {
    location: WorldPoint,
    radiance: Color,
}

/// Forward-traced light landings, queried by proximity during shading.
/// Photons are kept sorted by distance from the world origin so a lookup
/// can binary-search the candidate window instead of scanning everything.
#[derive(Clone, Debug, Default)]
pub struct PhotonMap {
    photons: Vec<Photon>,
}

impl PhotonMap {
    /// Gather radius matching the scene distance tolerance.
    pub const DEFAULT_RADIUS: FloatType = DOUBLE_ERROR;

    pub fn new() -> PhotonMap {
        PhotonMap { photons: Vec::new() }
    }

    /// Shoots `photons_per_light` photons from every light in the world.
    pub fn populate<R: Rng + ?Sized>(
        world: &World,
        photons_per_light: usize,
        rng: &mut R,
    ) -> PhotonMap {
        PhotonMap::populate_with_aims(world, &world.shapes, photons_per_light, rng)
    }

    /// Like `populate`, but every photon is aimed at one of `aims` instead
    /// of the scene at large. An empty slice aims at the whole scene.
    pub fn populate_with_aims<R: Rng + ?Sized>(
        world: &World,
        aims: &[Shape],
        photons_per_light: usize,
        rng: &mut R,
    ) -> PhotonMap {
        let aims = if aims.is_empty() { &world.shapes } else { aims };
        let mut map = PhotonMap::new();
        for light in &world.lights {
            map.add_aimed(world, light, aims, photons_per_light, rng);
        }
        map
    }

    /// Traces `photon_count` photons from one light and stores where they
    /// come to rest. Photons whose aims all miss are dropped, so the map
    /// may grow by less than `photon_count`.
    pub fn add_for_light<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        light: &Light,
        photon_count: usize,
        rng: &mut R,
    ) {
        self.add_aimed(world, light, &world.shapes, photon_count, rng);
    }

    fn add_aimed<R: Rng + ?Sized>(
        &mut self,
        world: &World,
        light: &Light,
        aims: &[Shape],
        photon_count: usize,
        rng: &mut R,
    ) {
        for _ in 0..photon_count {
            if let Some(result) = emit(world, light, aims, rng) {
                self.follow(&result, rng);
            }
        }
        self.photons
            .sort_by_key(|photon| OrderedFloat(photon.location.coords.norm()));
    }

    /// Walks a shading tree the way light would: branch results are picked
    /// in proportion to their share, leaves absorb the photon. Landings
    /// outside the world bound are discarded.
    fn follow<R: Rng + ?Sized>(&mut self, result: &LightingResult, rng: &mut R) {
        if result.point.coords.norm() > WORLD_BOUND {
            return;
        }
        if result.contributions.is_empty() {
            self.photons.push(Photon {
                location: result.point,
                radiance: result.radiance,
            });
            return;
        }

        let total: FloatType = result.contributions.iter().map(|(_, share)| share).sum();
        let mut remaining = rng.random::<FloatType>() * total;
        for (child, share) in &result.contributions {
            remaining -= share;
            if remaining < 0.0 {
                self.follow(child, rng);
                return;
            }
        }
        // every branch has zero share, absorb at the surface
        self.photons.push(Photon {
            location: result.point,
            radiance: result.radiance,
        });
    }

    /// Photon-density estimate: every photon within `radius`, weighted by
    /// the sphere area at its distance, averaged over the gathered count.
    pub fn radiance_at(&self, point: WorldPoint, radius: FloatType) -> Color {
        let center = point.coords.norm();
        let lower = self
            .photons
            .partition_point(|photon| photon.location.coords.norm() < center - radius);
        let upper = self
            .photons
            .partition_point(|photon| photon.location.coords.norm() <= center + radius);

        let mut gathered = BLACK;
        let mut count = 0usize;
        for photon in &self.photons[lower..upper] {
            let distance = (photon.location - point).norm();
            if distance > radius {
                continue;
            }
            gathered += photon.radiance * (1.0 / (4.0 * PI * distance.max(NEARLY_ZERO)));
            count += 1;
        }
        if count == 0 {
            return BLACK;
        }
        gathered * (1.0 / count as FloatType)
    }

    pub fn len(&self) -> usize {
        self.photons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photons.is_empty()
    }
}

/// One photon from the light into the scene. None when every aim failed
/// to produce a lighting result.
fn emit<R: Rng + ?Sized>(
    world: &World,
    light: &Light,
    aims: &[Shape],
    rng: &mut R,
) -> Option<LightingResult> {
    let origin = light.location();
    for _ in 0..MAX_AIM_ATTEMPTS {
        let ray = Ray::new(origin, random_emission_direction(aims, origin, rng));
        if let Some(result) = world.shade(&ray) {
            return Some(result);
        }
    }
    None
}

/// Aims at a random point of a random aim shape, then smears the direction
/// with Gaussian noise scaled by a uniform draw.
fn random_emission_direction<R: Rng + ?Sized>(
    aims: &[Shape],
    origin: WorldPoint,
    rng: &mut R,
) -> WorldVector {
    loop {
        let aim = match aims {
            [] => {
                let direction: [FloatType; 3] = UnitSphere.sample(rng);
                return WorldVector::new(direction[0], direction[1], direction[2]);
            }
            shapes => shapes[rng.random_range(0..shapes.len())].sample_point(rng, false),
        };
        let toward = match Unit::try_new(aim - origin, NEARLY_ZERO) {
            Some(unit) => unit.into_inner(),
            None => continue,
        };
        let jitter = WorldVector::new(
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
            StandardNormal.sample(rng),
        );
        let direction = toward + jitter * rng.random::<FloatType>();
        if direction.norm() > NEARLY_ZERO {
            return direction;
        }
    }
}
