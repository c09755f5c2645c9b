//! Component value helpers.
//!
//! Component values are dynamic JSON values keyed by component name. This
//! module holds the typed shapes the engine itself understands and the rules
//! for reading dynamic values.
//!
//! Submodules overview:
//! - [`geometry`] – `Vec2`, `Size` and `Rect`, plus the `position` component name
//! - [`sprite`] – sprite playback state stored under the `sprite` component
//! - [`value`] – truthiness of component values, as filters see it
pub mod geometry;
pub mod sprite;
pub mod value;
