//! Sprite definitions registry.
//!
//! A [`Sprite`] is a named list of frames cut out of image files plus an
//! offset applied when the sprite is drawn. Entities reference sprites by
//! name through their [`SpriteComponent`](crate::components::sprite::SpriteComponent);
//! the renderer and the animation system look the definition up here.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::components::geometry::{Rect, Size, Vec2};
use crate::error::{EngineError, EngineResult};

/// One frame: a rectangle of an image file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteFrame {
    /// Image reference handed to the surface.
    pub file: String,
    /// Top-left corner of the frame inside the image.
    pub origin: Vec2,
    pub size: Size,
}

impl SpriteFrame {
    pub fn source(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub name: String,
    pub frames: Vec<SpriteFrame>,
    #[serde(default)]
    pub offset: Vec2,
}

pub type SpriteSheet = Vec<Sprite>;

#[derive(Debug, Clone, Default)]
pub struct SpriteStore {
    sprites: FxHashMap<String, Sprite>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sprite under its name.
    pub fn add_sprite(&mut self, sprite: Sprite) {
        self.sprites.insert(sprite.name.clone(), sprite);
    }

    pub fn import_sprite_sheet(&mut self, sheet: SpriteSheet) {
        for sprite in sheet {
            self.add_sprite(sprite);
        }
    }

    /// Import a sprite sheet from its JSON form. Returns the number of
    /// sprites read.
    pub fn import_sprite_sheet_json(&mut self, json: &str) -> EngineResult<usize> {
        let sheet: SpriteSheet = serde_json::from_str(json)
            .map_err(|err| EngineError::invalid(format!("malformed sprite sheet: {err}")))?;
        let count = sheet.len();
        self.import_sprite_sheet(sheet);
        Ok(count)
    }

    pub fn get_sprite(&self, name: &str) -> EngineResult<&Sprite> {
        self.sprites
            .get(name)
            .ok_or_else(|| EngineError::SpriteNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sprites.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}
