use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::loader::{read_json_file, ContentError};

/// Pixel rectangle of one frame inside an atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Deserialize)]
struct AtlasFile {
    frames: AtlasFrameList,
}

/// Texture-packer output comes as either a name-keyed map or a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AtlasFrameList {
    Hash(HashMap<String, AtlasEntry>),
    Array(Vec<NamedAtlasEntry>),
}

#[derive(Debug, Deserialize)]
struct AtlasEntry {
    frame: AtlasRect,
}

#[derive(Debug, Deserialize)]
struct NamedAtlasEntry {
    filename: String,
    frame: AtlasRect,
}

#[derive(Debug, Clone, Default)]
pub struct AtlasFrames {
    frames: HashMap<String, AtlasRect>,
}

impl AtlasFrames {
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let file: AtlasFile = read_json_file(path)?;
        let frames: HashMap<String, AtlasRect> = match file.frames {
            AtlasFrameList::Hash(map) => map
                .into_iter()
                .map(|(name, entry)| (name, entry.frame))
                .collect(),
            AtlasFrameList::Array(list) => list
                .into_iter()
                .map(|entry| (entry.filename, entry.frame))
                .collect(),
        };
        if let Some((name, _)) = frames.iter().find(|(_, rect)| rect.w == 0 || rect.h == 0) {
            return Err(ContentError::invalid(
                path,
                format!("frame '{name}' has zero size"),
            ));
        }
        Ok(Self { frames })
    }

    pub fn frame(&self, name: &str) -> Option<AtlasRect> {
        self.frames.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn loads_hash_style_atlas() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("player.json");
        fs::write(
            &path,
            r#"{ "frames": {
                "idle_0": { "frame": { "x": 0, "y": 0, "w": 32, "h": 48 }, "rotated": false },
                "walk_0": { "frame": { "x": 32, "y": 0, "w": 32, "h": 48 } }
            }, "meta": { "image": "player.png" } }"#,
        )
        .expect("write");

        let atlas = AtlasFrames::load(&path).expect("atlas");
        assert_eq!(atlas.len(), 2);
        assert_eq!(
            atlas.frame("walk_0"),
            Some(AtlasRect {
                x: 32,
                y: 0,
                w: 32,
                h: 48
            })
        );
        assert_eq!(atlas.frame("jump_0"), None);
    }

    #[test]
    fn loads_array_style_atlas() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("player.json");
        fs::write(
            &path,
            r#"{ "frames": [ { "filename": "fall_0", "frame": { "x": 0, "y": 48, "w": 32, "h": 48 } } ] }"#,
        )
        .expect("write");

        let atlas = AtlasFrames::load(&path).expect("atlas");
        assert_eq!(atlas.frame("fall_0").map(|rect| rect.y), Some(48));
    }

    #[test]
    fn zero_sized_frame_is_rejected() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("bad.json");
        fs::write(
            &path,
            r#"{ "frames": { "x": { "frame": { "x": 0, "y": 0, "w": 0, "h": 4 } } } }"#,
        )
        .expect("write");
        assert!(matches!(
            AtlasFrames::load(&path),
            Err(ContentError::Invalid { .. })
        ));
    }
}
