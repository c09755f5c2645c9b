//! Sprite rendering.
//!
//! The engine never paints pixels itself. It hands [`DrawCommand`]s to a
//! [`Surface`] supplied by the host. [`SpriteRenderer`] is the module that
//! wires this up: on `update` it advances sprite animations, on `draw` it
//! paints every entity with a `sprite` and a `position` through each active
//! viewport of the current room.
//!
//! Screen placement of a sprite seen through a viewport:
//!
//! ```text
//! destination = position + sprite.offset - viewport.origin + viewport.position
//! ```
//!
//! A room without viewports is painted once, in room coordinates.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::trace;

use crate::components::geometry::{POSITION, Rect, Vec2};
use crate::components::sprite::{SPRITE, SpriteComponent};
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::events::phase;
use crate::resources::filter::EntityFilter;
use crate::resources::spritestore::SpriteStore;
use crate::resources::viewports::Viewport;
use crate::systems::animation::update_animated_sprites;

/// One image blit.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub image: String,
    /// Region of the image to copy.
    pub source: Rect,
    /// Top-left corner on the surface.
    pub destination: Vec2,
    pub scale: f32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
}

/// A drawing target. Calls are synchronous and side-effect only.
pub trait Surface {
    fn draw_image(&mut self, command: &DrawCommand);
}

/// Surface that keeps every command; used headless and in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand out the recorded commands and start over.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn draw_image(&mut self, command: &DrawCommand) {
        self.commands.push(command.clone());
    }
}

/// Sprite animation and painting module.
pub struct SpriteRenderer {
    sprites: Rc<RefCell<SpriteStore>>,
    surface: Rc<RefCell<dyn Surface>>,
    drawn: Rc<Cell<u64>>,
}

impl SpriteRenderer {
    pub fn new(sprites: SpriteStore, surface: Rc<RefCell<dyn Surface>>) -> Self {
        Self {
            sprites: Rc::new(RefCell::new(sprites)),
            surface,
            drawn: Rc::new(Cell::new(0)),
        }
    }

    /// Module constructor: registers the `update` and `draw` handlers.
    pub fn install(self, engine: &mut Engine) -> EngineResult<Self> {
        let sprites = self.sprites.clone();
        engine.add_event_handler(phase::UPDATE, move |engine, _| {
            let sprites = sprites
                .try_borrow()
                .map_err(|_| EngineError::handler("sprite store is being modified"))?;
            let now = engine.time().elapsed_ms;
            update_animated_sprites(engine, &sprites, now)?;
            Ok(())
        });

        let sprites = self.sprites.clone();
        let surface = self.surface.clone();
        let drawn = self.drawn.clone();
        engine.add_event_handler(phase::DRAW, move |engine, _| {
            let sprites = sprites
                .try_borrow()
                .map_err(|_| EngineError::handler("sprite store is being modified"))?;
            let mut surface = surface
                .try_borrow_mut()
                .map_err(|_| EngineError::handler("surface is already in use"))?;
            let count = render_sprites(engine, &sprites, &mut *surface)?;
            drawn.set(drawn.get() + count as u64);
            Ok(())
        });

        Ok(self)
    }

    /// Shared sprite definitions; add or import sprites through it.
    pub fn sprites(&self) -> Rc<RefCell<SpriteStore>> {
        self.sprites.clone()
    }

    /// Total draw commands issued so far.
    pub fn drawn(&self) -> u64 {
        self.drawn.get()
    }
}

/// Paint the sprites of the current room onto `surface`. Returns the number
/// of draw commands issued.
pub fn render_sprites(engine: &Engine, sprites: &SpriteStore, surface: &mut dyn Surface) -> EngineResult<usize> {
    let Some(room) = engine.current_room() else {
        return Ok(0);
    };
    let entities = engine.get_entities(&EntityFilter::new().require(SPRITE).require(POSITION));

    let viewports: Vec<Option<Viewport>> = if room.viewports().is_empty() {
        vec![None]
    } else {
        engine
            .viewports_in_current_room()
            .into_iter()
            .filter(|viewport| viewport.is_active)
            .map(Some)
            .collect()
    };

    let mut issued = 0;
    for viewport in &viewports {
        for entity in &entities {
            let Some(position) = engine.get_component_as::<Vec2>(POSITION, entity.id())? else {
                continue;
            };
            let Some(sprite) = engine.get_component_as::<SpriteComponent>(SPRITE, entity.id())? else {
                continue;
            };
            let definition = sprites.get_sprite(&sprite.name)?;
            let Some(frame) = definition.frames.get(sprite.current_frame_index) else {
                trace!(
                    "sprite '{}' has no frame {}",
                    sprite.name, sprite.current_frame_index
                );
                continue;
            };

            let world = position + definition.offset;
            let destination = match viewport {
                Some(viewport) => {
                    let bounds = Rect::from_origin_size(viewport.origin, viewport.size);
                    let extent = Rect::new(
                        world.x,
                        world.y,
                        frame.size.width * sprite.scale,
                        frame.size.height * sprite.scale,
                    );
                    if !overlaps(&bounds, &extent) {
                        continue;
                    }
                    world - viewport.origin + viewport.position
                }
                None => world,
            };

            surface.draw_image(&DrawCommand {
                image: frame.file.clone(),
                source: frame.source(),
                destination,
                scale: sprite.scale,
                flip_horizontal: sprite.flip_horizontal,
                flip_vertical: sprite.flip_vertical,
            });
            issued += 1;
        }
    }
    Ok(issued)
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    !(b.x + b.width < a.x || b.x > a.x + a.width || b.y + b.height < a.y || b.y > a.y + a.height)
}
