//! The animated field: palette, field function, compositor, presenter and
//! the scheduler that ties them to a host refresh loop.

mod compositor;
mod field;
mod host;
mod palette;
mod present;
mod scheduler;
mod state;

pub use compositor::{Compositor, LowResBuffer, DRIFT_MAGNITUDE};
pub use field::field;
pub use host::{FixedHost, Host, Layout, Viewport, MAX_DPR, MIN_BUFFER_DIM};
pub use palette::{palette, Palette, PALETTE_SIZE};
pub use present::{Presenter, Surface};
pub use scheduler::{Phase, Scheduler, SchedulerOptions, TickOutcome};
pub use state::{
    Direction, QualityPreset, RenderState, DRIFT_DAMPING, FLASH_DECAY, FLASH_MAX, FLASH_STEP,
    MAX_FRAME_DT,
};
