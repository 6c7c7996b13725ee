mod engine;
mod interval;

pub use engine::TimerEngine;
pub use interval::{IntervalKind, IntervalLengths};
