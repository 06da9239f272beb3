//! Snowplow-style event dispatch: self-describing records, the tracker
//! seam, and the user event handler.

pub mod emitter;
pub mod handler;
pub mod schema;
pub mod tracker;

pub use emitter::{CaptureEmitter, CollectorEmitter};
pub use handler::{EventHandler, UserEventHandler};
pub use tracker::{Emitter, EventEnvelope, Subject, Tracker};
