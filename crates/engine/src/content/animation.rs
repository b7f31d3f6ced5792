use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::loader::{read_json_file, ContentError};
use crate::sprite_keys::validate_sprite_key;

const DEFAULT_FRAME_RATE: f32 = 10.0;

#[derive(Debug, Deserialize)]
struct AnimationManifest {
    anims: Vec<AnimationDef>,
}

#[derive(Debug, Deserialize)]
struct AnimationDef {
    key: String,
    frames: Vec<FrameDef>,
    #[serde(rename = "frameRate", default = "default_frame_rate")]
    frame_rate: f32,
    #[serde(default)]
    repeat: i32,
}

#[derive(Debug, Deserialize)]
struct FrameDef {
    key: String,
    frame: FrameName,
}

/// Atlas exporters emit frame names as strings or bare indices.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameName {
    Text(String),
    Index(u64),
}

fn default_frame_rate() -> f32 {
    DEFAULT_FRAME_RATE
}

/// One frame of a clip: a named region of an atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRef {
    pub atlas: String,
    pub frame: String,
}

/// A keyed frame sequence. `repeat == -1` loops forever; `repeat == n` plays
/// the sequence `n + 1` times and then holds the last frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub key: String,
    pub frames: Vec<FrameRef>,
    pub frame_rate: f32,
    pub repeat: i32,
}

impl AnimationClip {
    fn step_at(&self, elapsed_seconds: f32) -> u64 {
        (elapsed_seconds.max(0.0) * self.frame_rate).floor() as u64
    }

    fn total_steps(&self) -> Option<u64> {
        if self.repeat < 0 {
            return None;
        }
        Some(self.frames.len() as u64 * (self.repeat as u64 + 1))
    }

    pub fn frame_index_at(&self, elapsed_seconds: f32) -> usize {
        let frame_count = self.frames.len() as u64;
        if frame_count == 0 {
            return 0;
        }
        let step = self.step_at(elapsed_seconds);
        match self.total_steps() {
            Some(total) if step >= total => (frame_count - 1) as usize,
            _ => (step % frame_count) as usize,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationLibrary {
    clips: HashMap<String, AnimationClip>,
}

impl AnimationLibrary {
    pub fn from_clips(clips: impl IntoIterator<Item = AnimationClip>) -> Self {
        Self {
            clips: clips
                .into_iter()
                .map(|clip| (clip.key.clone(), clip))
                .collect(),
        }
    }

    pub fn clip(&self, key: &str) -> Option<&AnimationClip> {
        self.clips.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.clips.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

pub fn load_animation_library(path: &Path) -> Result<AnimationLibrary, ContentError> {
    let manifest: AnimationManifest = read_json_file(path)?;
    let mut clips = HashMap::with_capacity(manifest.anims.len());

    for (index, def) in manifest.anims.into_iter().enumerate() {
        let at = format!("anims[{index}]");
        if def.key.is_empty() {
            return Err(ContentError::invalid(path, format!("{at}.key must not be empty")));
        }
        if def.frames.is_empty() {
            return Err(ContentError::invalid(
                path,
                format!("{at}.frames must not be empty"),
            ));
        }
        if !def.frame_rate.is_finite() || def.frame_rate <= 0.0 {
            return Err(ContentError::invalid(
                path,
                format!("{at}.frameRate must be positive, got {}", def.frame_rate),
            ));
        }
        if def.repeat < -1 {
            return Err(ContentError::invalid(
                path,
                format!("{at}.repeat must be -1 or greater, got {}", def.repeat),
            ));
        }

        let mut frames = Vec::with_capacity(def.frames.len());
        for (frame_index, frame) in def.frames.into_iter().enumerate() {
            validate_sprite_key(&frame.key).map_err(|error| {
                ContentError::invalid(path, format!("{at}.frames[{frame_index}].key: {error}"))
            })?;
            frames.push(FrameRef {
                atlas: frame.key,
                frame: match frame.frame {
                    FrameName::Text(name) => name,
                    FrameName::Index(index) => index.to_string(),
                },
            });
        }

        let clip = AnimationClip {
            key: def.key,
            frames,
            frame_rate: def.frame_rate,
            repeat: def.repeat,
        };
        if clips.contains_key(&clip.key) {
            return Err(ContentError::invalid(
                path,
                format!("{at}.key '{}' is defined twice", clip.key),
            ));
        }
        clips.insert(clip.key.clone(), clip);
    }

    Ok(AnimationLibrary { clips })
}

/// Loads the manifest if present. Any failure leaves the caller with
/// placeholder rendering instead of aborting startup.
pub fn load_optional_animation_library(path: &Path) -> Option<AnimationLibrary> {
    if !path.is_file() {
        info!(path = %path.display(), "animation_manifest_missing_using_placeholders");
        return None;
    }
    match load_animation_library(path) {
        Ok(library) => {
            info!(path = %path.display(), clip_count = library.len(), "animation_manifest_loaded");
            Some(library)
        }
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "animation_manifest_load_failed_using_placeholders"
            );
            None
        }
    }
}

/// Playback cursor over a library clip.
#[derive(Debug, Clone, Default)]
pub struct AnimationPlayer {
    clip_key: Option<String>,
    elapsed_seconds: f32,
}

impl AnimationPlayer {
    /// Switches clips, restarting only when the key changes.
    pub fn play(&mut self, key: &str) {
        if self.clip_key.as_deref() == Some(key) {
            return;
        }
        self.clip_key = Some(key.to_string());
        self.elapsed_seconds = 0.0;
    }

    pub fn advance(&mut self, dt_seconds: f32) {
        if self.clip_key.is_some() && dt_seconds.is_finite() && dt_seconds > 0.0 {
            self.elapsed_seconds += dt_seconds;
        }
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.clip_key.as_deref()
    }

    pub fn current_frame<'a>(&self, library: &'a AnimationLibrary) -> Option<&'a FrameRef> {
        let clip = library.clip(self.clip_key.as_deref()?)?;
        clip.frames.get(clip.frame_index_at(self.elapsed_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn clip(key: &str, frame_count: usize, frame_rate: f32, repeat: i32) -> AnimationClip {
        AnimationClip {
            key: key.to_string(),
            frames: (0..frame_count)
                .map(|index| FrameRef {
                    atlas: "player".to_string(),
                    frame: format!("{key}_{index}"),
                })
                .collect(),
            frame_rate,
            repeat,
        }
    }

    fn write_manifest(json: &str) -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("player.json");
        fs::write(&path, json).expect("write");
        (temp, path)
    }

    #[test]
    fn looping_clip_wraps_around() {
        let walk = clip("walk", 4, 10.0, -1);
        assert_eq!(walk.frame_index_at(0.0), 0);
        assert_eq!(walk.frame_index_at(0.35), 3);
        assert_eq!(walk.frame_index_at(0.45), 0);
        assert_eq!(walk.frame_index_at(100.0), 0);
    }

    #[test]
    fn finite_clip_holds_last_frame() {
        let jump = clip("jump", 3, 10.0, 1);
        assert_eq!(jump.frame_index_at(0.35), 0);
        assert_eq!(jump.frame_index_at(0.55), 2);
        assert_eq!(jump.frame_index_at(0.65), 2);
        assert_eq!(jump.frame_index_at(9.0), 2);
    }

    #[test]
    fn player_restarts_only_on_clip_change() {
        let library =
            AnimationLibrary::from_clips([clip("idle", 2, 4.0, -1), clip("walk", 4, 8.0, -1)]);
        let mut player = AnimationPlayer::default();
        player.play("walk");
        player.advance(0.25);
        assert_eq!(player.current_frame(&library).map(|f| f.frame.as_str()), Some("walk_2"));

        player.play("walk");
        assert_eq!(player.current_frame(&library).map(|f| f.frame.as_str()), Some("walk_2"));

        player.play("idle");
        assert_eq!(player.current_frame(&library).map(|f| f.frame.as_str()), Some("idle_0"));
    }

    #[test]
    fn player_without_known_clip_has_no_frame() {
        let library = AnimationLibrary::default();
        let mut player = AnimationPlayer::default();
        assert!(player.current_frame(&library).is_none());
        player.play("missing");
        player.advance(1.0);
        assert!(player.current_frame(&library).is_none());
    }

    #[test]
    fn loads_manifest_with_numeric_and_named_frames() {
        let (_temp, path) = write_manifest(
            r#"{ "anims": [
                { "key": "idle", "frames": [ { "key": "player", "frame": "idle_0" } ], "frameRate": 4, "repeat": -1 },
                { "key": "jump", "frames": [ { "key": "player", "frame": 7 } ] }
            ] }"#,
        );
        let library = load_animation_library(&path).expect("library");
        assert_eq!(library.len(), 2);
        let jump = library.clip("jump").expect("jump");
        assert_eq!(jump.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(jump.repeat, 0);
        assert_eq!(jump.frames[0].frame, "7");
    }

    #[test]
    fn rejects_invalid_clips() {
        let cases = [
            r#"{ "anims": [ { "key": "idle", "frames": [] } ] }"#,
            r#"{ "anims": [ { "key": "idle", "frames": [ { "key": "player", "frame": "a" } ], "frameRate": 0 } ] }"#,
            r#"{ "anims": [ { "key": "idle", "frames": [ { "key": "player", "frame": "a" } ], "repeat": -2 } ] }"#,
            r#"{ "anims": [ { "key": "idle", "frames": [ { "key": "../x", "frame": "a" } ] } ] }"#,
            r#"{ "anims": [
                { "key": "idle", "frames": [ { "key": "player", "frame": "a" } ] },
                { "key": "idle", "frames": [ { "key": "player", "frame": "b" } ] }
            ] }"#,
        ];
        for json in cases {
            let (_temp, path) = write_manifest(json);
            assert!(
                matches!(load_animation_library(&path), Err(ContentError::Invalid { .. })),
                "json={json}"
            );
        }
    }

    #[test]
    fn optional_loader_degrades_to_none() {
        let temp = TempDir::new().expect("temp");
        assert!(load_optional_animation_library(&temp.path().join("absent.json")).is_none());

        let (_temp, path) = write_manifest("{ not json");
        assert!(load_optional_animation_library(&path).is_none());
    }
}
