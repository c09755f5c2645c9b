//! Per-engine pointer input state.
//!
//! The host feeds raw pointer activity into [`InputState`] between frames
//! (`press`, `release`, `move_to`, `blur`); the mouse module reads it during
//! the `update` phase and calls [`InputState::end_frame`] on `endUpdate`.
//! Each engine owns its own value, so several engines (or tests) never share
//! pointer state.
//!
//! Button sets per frame:
//! - *down*: buttons that went down since the last frame ended
//! - *pressed*: buttons currently held
//! - *up*: buttons released since the last frame ended
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::components::geometry::{Size, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Map a host button index (0 = left … 4 = forward).
    pub fn from_index(index: u16) -> Option<Self> {
        match index {
            0 => Some(MouseButton::Left),
            1 => Some(MouseButton::Middle),
            2 => Some(MouseButton::Right),
            3 => Some(MouseButton::Back),
            4 => Some(MouseButton::Forward),
            _ => None,
        }
    }
}

type ButtonSet = SmallVec<[MouseButton; 5]>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    down: ButtonSet,
    pressed: ButtonSet,
    up: ButtonSet,
    position: Vec2,
    previous_position: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A button went down.
    pub fn press(&mut self, button: MouseButton) {
        if !self.is_down(button) && !self.is_pressed(button) {
            self.down.push(button);
        }
        if !self.is_pressed(button) {
            self.pressed.push(button);
        }
    }

    /// A button was released.
    pub fn release(&mut self, button: MouseButton) {
        self.pressed.retain(|b| *b != button);
        if !self.is_up(button) {
            self.up.push(button);
        }
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Move to a raw host position relative to a surface, clamped to the
    /// surface bounds and rounded to whole pixels.
    pub fn move_within(&mut self, raw: Vec2, bounds: Size) {
        self.position = Vec2::new(
            raw.x.clamp(0.0, bounds.width.max(0.0)).round(),
            raw.y.clamp(0.0, bounds.height.max(0.0)).round(),
        );
    }

    /// The host lost focus: forget every button.
    pub fn blur(&mut self) {
        self.down.clear();
        self.pressed.clear();
        self.up.clear();
    }

    /// Close the frame: remember the position and clear the edge sets.
    pub fn end_frame(&mut self) {
        self.previous_position = self.position;
        self.down.clear();
        self.up.clear();
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.down.contains(&button)
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    pub fn is_up(&self, button: MouseButton) -> bool {
        self.up.contains(&button)
    }

    pub fn down(&self) -> &[MouseButton] {
        &self.down
    }

    pub fn pressed(&self) -> &[MouseButton] {
        &self.pressed
    }

    pub fn up(&self) -> &[MouseButton] {
        &self.up
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the pointer moved since the last frame ended.
    pub fn moved(&self) -> bool {
        self.position != self.previous_position
    }
}
