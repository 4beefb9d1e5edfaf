use crate::color::Color;
use crate::geometry::{ScreenBlock, ScreenPoint};
use crate::renderer::supersample::{Antialiasing, SampleGrid};
use crate::world::World;

/// Per-thread rendering state. The sample grid is built once per worker;
/// everything else comes in shared and read-only.
pub(super) struct Worker {
    samples: SampleGrid,
}

impl Worker {
    pub(super) fn new(antialiasing: Antialiasing) -> Worker {
        Worker {
            samples: SampleGrid::new(antialiasing),
        }
    }

    /// Shades every pixel of the unit and hands each to the sink exactly once.
    pub(super) fn render_unit(
        &self,
        world: &World,
        unit: ScreenBlock,
        draw_pixel: &(dyn Fn(ScreenPoint, Color) + Send + Sync),
    ) {
        for pixel in unit.internal_points() {
            let color = self.samples.sample_pixel(world, pixel);
            draw_pixel(pixel, color);
        }
    }
}
