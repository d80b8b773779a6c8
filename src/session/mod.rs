//! Session lifecycle: creation, completion, rating, and the engine
//! follow-ups they trigger.

pub mod manager;

pub use manager::{SessionError, SessionManager};
