pub mod engine;
pub mod path;
pub mod trail;

pub use engine::{ErrorReason, GestureTracingEngine, TraceEvent, TracePhase};
pub use path::{Segment, TargetPath, TargetPoint, ValidZone};
pub use trail::Trail;
