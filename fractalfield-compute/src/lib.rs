pub mod bitmap;
pub mod colorizer;
pub mod kernel;
pub mod normalizer;
pub mod scheduler;
pub mod walker;

pub use bitmap::{pack_rgba, Bitmap, OPAQUE_BLACK, RESTART_FILL};
pub use colorizer::{depth_cycle_length, shade};
pub use kernel::{escape_kernel, interior_check, warped_kernel};
pub use normalizer::normalize;
pub use scheduler::{FrameInput, FrameReport, Phase, ProbeSample, ProgressiveRenderer};
pub use walker::{default_worker_count, ScanParams, TileWalker};
