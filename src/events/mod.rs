//! Event dispatch.
//!
//! Submodules:
//! - [`bus`] – handler registry keyed by event name
//! - [`mouse`] – module turning pointer input into `mouse*` events
//! - [`phase`] – names of the events every frame emits
pub mod bus;
pub mod mouse;
pub mod phase;
