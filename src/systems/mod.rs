//! Frame-phase systems and the host-side frame driver.
//!
//! Submodules overview
//! - [`animation`] – advance sprite animations from the frame clock
//! - [`camera`] – keep viewports centred on the entity they follow
//! - [`render`] – rendering surface seam and the sprite renderer module
//! - [`scheduler`] – frame schedulers driving [`crate::engine::Engine::run`]

pub mod animation;
pub mod camera;
pub mod render;
pub mod scheduler;
