//! Interactive strokes: the engine, its flux gate, placement math, output groups and events.
pub mod engine;
pub mod events;
pub mod flux;
pub mod groups;
pub mod placement;

pub use engine::{PointerEvent, StrokeContext, StrokeEngine, ToolMode};
pub use events::{EventSink, FnSink, MultiSink, SkipReason, StrokeEvent, VecSink};
pub use flux::FluxGate;
pub use groups::{GroupCache, GroupScope};
pub use placement::Placement;
