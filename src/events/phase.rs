//! Frame phase event names.
//!
//! Every frame the engine emits [`UPDATE`], then [`END_UPDATE`], then
//! [`DRAW`]. Handlers attached to these names run synchronously in the order
//! they were registered.
//!
//! ```ignore
//! engine.add_event_handler(phase::UPDATE, |engine, _args| {
//!     // move things
//!     Ok(())
//! });
//! ```

/// Simulation step. Emitted first in every frame.
pub const UPDATE: &str = "update";

/// Emitted right after [`UPDATE`], even when an `update` handler failed.
/// Per-frame bookkeeping (input reset, camera follow) belongs here.
pub const END_UPDATE: &str = "endUpdate";

/// Paint the frame. Emitted after the update phases.
pub const DRAW: &str = "draw";

/// The phases in the order a frame emits them.
pub const FRAME_ORDER: [&str; 3] = [UPDATE, END_UPDATE, DRAW];
