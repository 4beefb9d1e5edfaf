mod machinery;
mod supersample;
mod worker;

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::geometry::{ScreenBlock, ScreenPoint, ScreenSize};

pub use crate::renderer::machinery::{RenderHandle, render};
pub use crate::renderer::supersample::Antialiasing;

/// How the image is cut into work units for the worker pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Contiguous bands of whole rows, roughly one per worker.
    RowBands,
    /// Contiguous bands of whole columns, roughly one per worker.
    ColumnBands,
    /// One unit per image row. Finer grained, so a slow region of the
    /// image stalls the pool less.
    Scanlines,
}

impl SplitStrategy {
    /// Cuts the image into units. The units are disjoint and together
    /// tile the image exactly.
    pub(crate) fn split(self, size: ScreenSize, workers: usize) -> Vec<ScreenBlock> {
        match self {
            SplitStrategy::RowBands => {
                let band = size.y.div_ceil(workers.max(1) as u32).max(1);
                (0..size.y)
                    .step_by(band as usize)
                    .map(|top| {
                        ScreenBlock::new(
                            ScreenPoint::new(0, top),
                            ScreenPoint::new(size.x, (top + band).min(size.y)),
                        )
                    })
                    .collect()
            }
            SplitStrategy::ColumnBands => {
                let band = size.x.div_ceil(workers.max(1) as u32).max(1);
                (0..size.x)
                    .step_by(band as usize)
                    .map(|left| {
                        ScreenBlock::new(
                            ScreenPoint::new(left, 0),
                            ScreenPoint::new((left + band).min(size.x), size.y),
                        )
                    })
                    .collect()
            }
            SplitStrategy::Scanlines => (0..size.y)
                .map(|row| {
                    ScreenBlock::new(ScreenPoint::new(0, row), ScreenPoint::new(size.x, row + 1))
                })
                .collect(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum WorkerCount {
    /// One worker per logical CPU.
    Auto,
    Manual(NonZeroUsize),
}

impl WorkerCount {
    pub(crate) fn get(self) -> usize {
        match self {
            WorkerCount::Auto => num_cpus::get().max(1),
            WorkerCount::Manual(count) => count.get(),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub antialiasing: Antialiasing,
    pub split_strategy: SplitStrategy,
    pub worker_count: WorkerCount,
}

impl RenderSettings {
    /// One ray per pixel, every core busy. Good for previews.
    pub fn fast() -> RenderSettings {
        RenderSettings {
            antialiasing: Antialiasing::Off,
            split_strategy: SplitStrategy::RowBands,
            worker_count: WorkerCount::Auto,
        }
    }

    /// Supersampled output for final images.
    pub fn detailed() -> RenderSettings {
        RenderSettings {
            antialiasing: Antialiasing::X8,
            ..RenderSettings::fast()
        }
    }
}

impl Default for RenderSettings {
    fn default() -> RenderSettings {
        RenderSettings::fast()
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to spawn a render worker: {0}")]
    SpawnError(#[from] std::io::Error),
}
