use std::f64::consts::TAU;

use crate::color::{BLACK, Color};
use crate::geometry::{FloatType, ScreenPoint};
use crate::world::World;

/// Sample counts for the sub-pixel grid. `Off` shoots exactly one camera
/// ray per pixel; the other levels trade render time for smoother edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Antialiasing {
    Off,
    X2,
    X4,
    X8,
    X16,
    X32,
}

impl Antialiasing {
    /// Sample grid side length; the grid is `side * side` rays.
    fn grid_side(self) -> u32 {
        match self {
            Antialiasing::Off => 1,
            Antialiasing::X2 => 2,
            Antialiasing::X4 => 3,
            Antialiasing::X8 => 5,
            Antialiasing::X16 => 9,
            Antialiasing::X32 => 17,
        }
    }
}

struct Sample {
    dx: FloatType,
    dy: FloatType,
    weight: FloatType,
}

/// Sub-pixel offsets with Gaussian filter weights, precomputed once per
/// worker. Offsets span the pixel from -0.5 to 0.5 on both axes.
pub(super) struct SampleGrid {
    samples: Vec<Sample>,
    total_weight: FloatType,
}

impl SampleGrid {
    pub(super) fn new(antialiasing: Antialiasing) -> SampleGrid {
        let side = antialiasing.grid_side();

        let mut samples = Vec::with_capacity((side * side) as usize);
        let mut total_weight = 0.0;
        for row in 0..side {
            for column in 0..side {
                let dx = grid_offset(column, side);
                let dy = grid_offset(row, side);
                let weight = gaussian_density((dx * dx + dy * dy).sqrt());

                total_weight += weight;
                samples.push(Sample { dx, dy, weight });
            }
        }

        SampleGrid { samples, total_weight }
    }

    /// Filtered color of one pixel. Rays that hit nothing contribute black
    /// but their weight still counts toward the normalization, so partially
    /// covered pixels darken toward the edge of a silhouette.
    pub(super) fn sample_pixel(&self, world: &World, pixel: ScreenPoint) -> Color {
        let mut gathered = BLACK;
        for sample in &self.samples {
            let ray = world.camera.ray_through(
                FloatType::from(pixel.x) + sample.dx,
                FloatType::from(pixel.y) + sample.dy,
            );
            if let Some(result) = world.shade(&ray) {
                gathered += result.radiance * sample.weight;
            }
        }
        gathered * (1.0 / self.total_weight)
    }
}

fn grid_offset(index: u32, side: u32) -> FloatType {
    if side == 1 {
        0.0
    } else {
        FloatType::from(index) / FloatType::from(side - 1) - 0.5
    }
}

/// Normal distribution density with deviation 0.5, evaluated at the
/// sample's distance from the pixel center.
fn gaussian_density(radius: FloatType) -> FloatType {
    const SIGMA: FloatType = 0.5;
    (-radius * radius / (2.0 * SIGMA * SIGMA)).exp() / (SIGMA * TAU.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    use crate::camera::Camera;
    use crate::color::WHITE;
    use crate::geometry::ScreenSize;
    use crate::shading::{EnvironmentMap, LightingModel};
    use crate::shape::Shape;
    use crate::transform::Transform;

    #[test_case(Antialiasing::Off, 1 ; "off")]
    #[test_case(Antialiasing::X2, 2 ; "x2")]
    #[test_case(Antialiasing::X4, 3 ; "x4")]
    #[test_case(Antialiasing::X8, 5 ; "x8")]
    #[test_case(Antialiasing::X16, 9 ; "x16")]
    #[test_case(Antialiasing::X32, 17 ; "x32")]
    fn grid_side_per_level(antialiasing: Antialiasing, side: u32) {
        assert!(antialiasing.grid_side() == side);
        assert!(SampleGrid::new(antialiasing).samples.len() == (side * side) as usize);
    }

    #[test]
    fn offsets_stay_inside_the_pixel() {
        let grid = SampleGrid::new(Antialiasing::X8);
        for sample in &grid.samples {
            assert!(sample.dx >= -0.5 && sample.dx <= 0.5);
            assert!(sample.dy >= -0.5 && sample.dy <= 0.5);
            assert!(sample.weight > 0.0);
        }
    }

    #[test]
    fn center_sample_weighs_the_most() {
        let grid = SampleGrid::new(Antialiasing::X4);
        let center = grid
            .samples
            .iter()
            .find(|sample| sample.dx == 0.0 && sample.dy == 0.0)
            .unwrap();
        for sample in &grid.samples {
            assert!(sample.weight <= center.weight);
        }
    }

    fn uniform_world() -> World {
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(4, 4)).build());
        world.lighting_model = LightingModel::Flat
            .with_environment(EnvironmentMap::from_fn(|_| Color::new(0.25, 0.5, 0.75)));
        world
    }

    #[test_case(Antialiasing::Off ; "off")]
    #[test_case(Antialiasing::X8 ; "x8")]
    #[test_case(Antialiasing::X32 ; "x32")]
    fn uniform_radiance_is_invariant_under_sampling(antialiasing: Antialiasing) {
        let world = uniform_world();
        let color = SampleGrid::new(antialiasing).sample_pixel(&world, ScreenPoint::new(1, 2));

        assert!((color.r - 0.25).abs() < 1e-12);
        assert!((color.g - 0.5).abs() < 1e-12);
        assert!((color.b - 0.75).abs() < 1e-12);
    }

    #[test]
    fn off_matches_the_plain_camera_ray() {
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(9, 9)).build());
        world
            .shapes
            .push(Shape::sphere().with_transform(Transform::translate(0.0, 0.0, 5.0)));
        world.lighting_model = LightingModel::Flat;

        let pixel = ScreenPoint::new(4, 4);
        let direct = world
            .shade(&world.camera.ray_through(4.0, 4.0))
            .unwrap()
            .radiance;
        let sampled = SampleGrid::new(Antialiasing::Off).sample_pixel(&world, pixel);

        assert!((sampled.r - direct.r).abs() < 1e-12);
        assert!((sampled.g - direct.g).abs() < 1e-12);
        assert!((sampled.b - direct.b).abs() < 1e-12);
    }

    #[test]
    fn misses_darken_the_average() {
        // Small sphere dead ahead: the center ray hits, the corner rays miss.
        let mut world = World::new(Camera::builder().resolution(ScreenSize::new(3, 3)).build());
        world.shapes.push(
            Shape::sphere()
                .with_transform(Transform::scale_uniform(0.05))
                .with_transform(Transform::translate(0.0, 0.0, 5.0)),
        );
        world.lighting_model = LightingModel::Flat;

        let pixel = ScreenPoint::new(1, 1);
        let sampled = SampleGrid::new(Antialiasing::X8).sample_pixel(&world, pixel);
        let direct = SampleGrid::new(Antialiasing::Off).sample_pixel(&world, pixel);

        assert!(direct == WHITE);
        assert!(sampled.r > 0.0);
        assert!(sampled.r < direct.r);
    }
}
