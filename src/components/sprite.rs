use serde::{Deserialize, Serialize};

/// Component name under which [`SpriteComponent`] values are stored.
pub const SPRITE: &str = "sprite";

/// Sprite playback state attached to an entity.
///
/// `name` selects a [`Sprite`](crate::resources::spritestore::Sprite) from the
/// sprite store; `current_frame_index` picks the frame that gets drawn. The
/// animation clock starts on the first update after `animation_start_time`
/// is cleared. Scale and flips are forwarded to the surface untouched.
///
/// Stored as JSON with camelCase keys (`framesPerSecond`, `isLooping`, ...);
/// unknown keys are an error rather than silently defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpriteComponent {
    pub name: String,
    #[serde(default)]
    pub animation_start_time: Option<f64>,
    #[serde(default)]
    pub current_frame_index: usize,
    #[serde(default = "default_fps")]
    pub frames_per_second: f32,
    #[serde(default = "default_true")]
    pub is_looping: bool,
    #[serde(default = "default_true")]
    pub is_animating: bool,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub flip_vertical: bool,
}

fn default_fps() -> f32 {
    12.0
}

fn default_true() -> bool {
    true
}

fn default_scale() -> f32 {
    1.0
}

/// Options for [`SpriteComponent::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateSpriteOptions {
    pub starting_frame: usize,
    pub frames_per_second: f32,
    pub is_looping: bool,
    pub is_animating: bool,
}

impl Default for CreateSpriteOptions {
    fn default() -> Self {
        Self {
            starting_frame: 0,
            frames_per_second: default_fps(),
            is_looping: true,
            is_animating: true,
        }
    }
}

impl SpriteComponent {
    pub fn new(name: impl Into<String>, options: CreateSpriteOptions) -> Self {
        Self {
            name: name.into(),
            animation_start_time: None,
            current_frame_index: options.starting_frame,
            frames_per_second: options.frames_per_second,
            is_looping: options.is_looping,
            is_animating: options.is_animating,
            scale: default_scale(),
            flip_horizontal: false,
            flip_vertical: false,
        }
    }

    /// A sprite that always shows the given frame.
    pub fn still(name: impl Into<String>, frame: usize) -> Self {
        Self::new(
            name,
            CreateSpriteOptions {
                starting_frame: frame,
                is_animating: false,
                ..Default::default()
            },
        )
    }
}
