//! Parameter adaptation: the deterministic rule table that tunes a
//! user's breathing timings from comfort feedback.

pub mod engine;

pub use engine::{adjust, AdaptationEngine, AdaptationStrategy};
