//! Mouse events module.
//!
//! Turns the engine's [`InputState`](crate::resources::input::InputState)
//! into events once per frame. On `update` it emits, in order:
//!
//! - `mouseMove` `{position}` when the pointer moved since the last frame
//! - `mouseDown` `{button, position}` per button that went down
//! - `mousePressed` `{button, position}` per held button
//! - `mouseUp` `{button, position}` per released button
//!
//! On `endUpdate` it closes the input frame.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::components::geometry::Vec2;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::events::phase;
use crate::resources::input::MouseButton;

pub const MOUSE_MOVE: &str = "mouseMove";
pub const MOUSE_DOWN: &str = "mouseDown";
pub const MOUSE_PRESSED: &str = "mousePressed";
pub const MOUSE_UP: &str = "mouseUp";

#[derive(Debug, Clone, Default)]
pub struct MouseEvents {
    emitted: Rc<Cell<u64>>,
}

impl MouseEvents {
    /// Module constructor: registers the `update` and `endUpdate` handlers.
    pub fn install(engine: &mut Engine) -> EngineResult<Self> {
        let module = MouseEvents::default();

        let emitted = module.emitted.clone();
        engine.add_event_handler(phase::UPDATE, move |engine, _| {
            let input = engine.input().clone();
            let position = input.position();

            if input.moved() {
                engine.emit_event(MOUSE_MOVE, &[json!({ "position": position })])?;
                emitted.set(emitted.get() + 1);
            }
            for (event, buttons) in [
                (MOUSE_DOWN, input.down()),
                (MOUSE_PRESSED, input.pressed()),
                (MOUSE_UP, input.up()),
            ] {
                for button in buttons {
                    engine.emit_event(event, &[button_payload(*button, position)])?;
                    emitted.set(emitted.get() + 1);
                }
            }
            Ok(())
        });

        engine.add_event_handler(phase::END_UPDATE, |engine, _| {
            engine.input_mut().end_frame();
            Ok(())
        });

        Ok(module)
    }

    /// Total mouse events emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.get()
    }
}

fn button_payload(button: MouseButton, position: Vec2) -> Value {
    json!({ "button": button, "position": position })
}

/// Read the button of a `mouseDown`/`mousePressed`/`mouseUp` payload.
pub fn payload_button(payload: &Value) -> Option<MouseButton> {
    serde_json::from_value(payload.get("button")?.clone()).ok()
}

/// Read the position of any mouse event payload.
pub fn payload_position(payload: &Value) -> Option<Vec2> {
    serde_json::from_value(payload.get("position")?.clone()).ok()
}
