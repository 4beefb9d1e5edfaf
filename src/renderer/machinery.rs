use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::thread::{self, JoinHandle};

use crate::color::Color;
use crate::geometry::{ScreenBlock, ScreenPoint};
use crate::renderer::worker::Worker;
use crate::renderer::{RenderError, RenderSettings};
use crate::world::World;

type PixelSink = Box<dyn Fn(ScreenPoint, Color) + Send + Sync>;

/// Starts rendering the world on a pool of worker threads and returns
/// immediately. Workers pull work units off a shared queue and push
/// finished pixels through `draw_pixel`; no pixel is delivered twice.
/// The world is frozen for the whole render.
pub fn render(
    world: World,
    settings: RenderSettings,
    draw_pixel: impl Fn(ScreenPoint, Color) + Send + Sync + 'static,
) -> Result<RenderHandle, RenderError> {
    let worker_count = settings.worker_count.get();
    let units = settings
        .split_strategy
        .split(world.camera.get_resolution(), worker_count);

    let state = Arc::new(RenderState {
        world,
        settings,
        units,
        next_unit_index: AtomicUsize::new(0),
        finished_units: AtomicUsize::new(0),
        draw_pixel: Box::new(draw_pixel),
    });

    // Pinning is best effort; on platforms with no core list the workers
    // just float.
    let cores = core_affinity::get_core_ids().unwrap_or_default();

    let threads = (0..worker_count)
        .map(|worker_id| {
            let state = Arc::clone(&state);
            let core = (!cores.is_empty()).then(|| cores[worker_id % cores.len()]);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let worker = Worker::new(state.settings.antialiasing);
                    while let Some(unit) = state.next_unit() {
                        worker.render_unit(&state.world, unit, &*state.draw_pixel);
                        state.finished_units.fetch_add(1, Ordering::AcqRel);
                    }
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderHandle { state, threads })
}

/// Owner's view of a running render.
pub struct RenderHandle {
    state: Arc<RenderState>,
    threads: Vec<JoinHandle<()>>,
}

impl RenderHandle {
    /// Returns the number of finished and total work units.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.state.units.len();
        let finished = self.state.finished_units.load(Ordering::Acquire).min(total);
        (finished, total)
    }

    pub fn progress_percent(&self) -> f32 {
        let (finished, total) = self.progress();
        100.0 * (finished as f32) / (total as f32).max(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signals the workers to stop. Units already being rendered still
    /// complete and deliver their pixels, but no new ones are handed out.
    pub fn shutdown(&self) {
        self.state
            .next_unit_index
            .store(self.state.units.len(), Ordering::Release);
    }

    /// Blocks until every worker has exited.
    pub fn wait(&mut self) {
        self.threads
            .drain(..)
            .for_each(|handle| handle.join().unwrap());
    }
}

struct RenderState {
    world: World,
    settings: RenderSettings,

    units: Vec<ScreenBlock>,
    next_unit_index: AtomicUsize,
    finished_units: AtomicUsize,

    draw_pixel: PixelSink,
}

impl RenderState {
    fn next_unit(&self) -> Option<ScreenBlock> {
        let id = self.next_unit_index.fetch_add(1, Ordering::AcqRel);
        self.units.get(id).copied()
    }
}
