#![forbid(unsafe_code)]

mod rendering;
mod store;

pub use rendering::{init_tracing, render_scene_to_png, RenderConfig, SourceStyle};
pub use store::RonOptionStore;
