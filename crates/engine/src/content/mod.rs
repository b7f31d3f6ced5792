mod animation;
mod atlas;
mod loader;

pub use animation::{
    load_animation_library, load_optional_animation_library, AnimationClip, AnimationLibrary,
    AnimationPlayer, FrameRef,
};
pub use atlas::{AtlasFrames, AtlasRect};
pub use loader::{read_json_file, ContentError};
