use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Entity, RenderableKind, SceneWorld};
use crate::content::{AtlasFrames, AtlasRect};
use crate::sprite_keys::validate_sprite_key;

use super::modal::draw_modal;
use super::primitives::{draw_filled_rect, draw_rect_outline};
use super::text::{draw_text, line_advance_px, text_width_px};
use super::transform::world_rect_to_screen;
use super::{PxRect, Viewport};

const LETTERBOX_COLOR: [u8; 4] = [8, 9, 12, 255];
const SKY_TOP_COLOR: [u8; 4] = [38, 52, 86, 255];
const SKY_BOTTOM_COLOR: [u8; 4] = [214, 146, 112, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [220, 220, 240, 255];
const PLACEHOLDER_BORDER_COLOR: [u8; 4] = [60, 64, 80, 255];
const METER_TRACK_COLOR: [u8; 4] = [30, 34, 44, 255];
const METER_BORDER_COLOR: [u8; 4] = [240, 240, 240, 255];
const LABEL_COLOR: [u8; 4] = [255, 255, 255, 255];
const HUD_COLOR: [u8; 4] = [250, 246, 232, 255];
const HUD_SHADOW_COLOR: [u8; 4] = [0, 0, 0, 255];
const BASE_TEXT_SCALE: f32 = 2.0;

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

struct LoadedAtlas {
    image: LoadedSprite,
    frames: AtlasFrames,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    asset_root: Option<PathBuf>,
    background_key: Option<String>,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    atlas_cache: HashMap<String, Option<LoadedAtlas>>,
    warned_missing_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        asset_root: Option<PathBuf>,
        background_key: Option<String>,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            asset_root,
            background_key,
            sprite_cache: HashMap::new(),
            atlas_cache: HashMap::new(),
            warned_missing_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Draws background, entities, labels, HUD and the modal overlay, in
    /// that order.
    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.is_empty() {
            return Ok(());
        }

        let Viewport { width, height } = self.viewport;
        let window_size = (width, height);
        let stage_rect = self.viewport.stage_rect();
        let text_scale = ((BASE_TEXT_SCALE * self.viewport.scale()).round() as i32).max(1);
        let mut assets = AssetCaches {
            asset_root: self.asset_root.as_deref(),
            sprite_cache: &mut self.sprite_cache,
            atlas_cache: &mut self.atlas_cache,
            warned_missing_keys: &mut self.warned_missing_keys,
        };
        let frame = self.pixels.frame_mut();

        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&LETTERBOX_COLOR);
        }

        let background = self
            .background_key
            .as_deref()
            .and_then(|key| assets.sprite(key));
        match background {
            Some(sprite) => draw_image_region(
                frame,
                width,
                height,
                stage_rect,
                sprite,
                full_region(sprite),
                false,
            ),
            None => draw_vertical_gradient(frame, width, height, stage_rect),
        }

        for entity in world.entities().iter().filter(|entity| entity.visible) {
            let rect = world_rect_to_screen(window_size, entity.bounds());
            draw_entity(frame, width, height, rect, entity, &mut assets);
            if let Some(label) = entity.label.as_deref() {
                draw_centered_label(frame, width, height, rect, label, text_scale);
            }
        }

        let line_advance = line_advance_px(text_scale);
        let margin = 4 * text_scale;
        for (row, line) in world.hud_lines().iter().enumerate() {
            let x = stage_rect.x + margin;
            let y = stage_rect.y + margin + row as i32 * line_advance;
            draw_text(frame, width, height, x + 1, y + 1, line, HUD_SHADOW_COLOR, text_scale);
            draw_text(frame, width, height, x, y, line, HUD_COLOR, text_scale);
        }

        if let Some(content) = world.overlay().active_content() {
            draw_modal(frame, width, height, content);
        }

        self.pixels.render()
    }
}

/// Without an asset root every lookup misses silently and callers draw
/// placeholders.
struct AssetCaches<'a> {
    asset_root: Option<&'a Path>,
    sprite_cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    atlas_cache: &'a mut HashMap<String, Option<LoadedAtlas>>,
    warned_missing_keys: &'a mut HashSet<String>,
}

impl AssetCaches<'_> {
    fn sprite(&mut self, key: &str) -> Option<&LoadedSprite> {
        if !self.sprite_cache.contains_key(key) {
            let sprite = self.asset_root.and_then(|root| {
                let loaded = resolve_asset_path(root, "sprites", key, "png").and_then(|path| {
                    load_sprite_rgba(&path).map_err(|reason| (Some(path), reason))
                });
                match loaded {
                    Ok(sprite) => Some(sprite),
                    Err((path, reason)) => {
                        warn_sprite_load_once(
                            self.warned_missing_keys,
                            key,
                            path.as_deref(),
                            &reason,
                        );
                        None
                    }
                }
            });
            self.sprite_cache.insert(key.to_string(), sprite);
        }
        self.sprite_cache.get(key).and_then(Option::as_ref)
    }

    fn atlas(&mut self, key: &str) -> Option<&LoadedAtlas> {
        if !self.atlas_cache.contains_key(key) {
            let atlas = self.asset_root.and_then(|root| match load_atlas(root, key) {
                Ok(atlas) => Some(atlas),
                Err((path, reason)) => {
                    warn_sprite_load_once(
                        self.warned_missing_keys,
                        key,
                        path.as_deref(),
                        &reason,
                    );
                    None
                }
            });
            self.atlas_cache.insert(key.to_string(), atlas);
        }
        self.atlas_cache.get(key).and_then(Option::as_ref)
    }
}

type LoadFailure = (Option<PathBuf>, String);

fn resolve_asset_path(
    asset_root: &Path,
    dir: &str,
    key: &str,
    extension: &str,
) -> Result<PathBuf, LoadFailure> {
    validate_sprite_key(key).map_err(|error| (None, format!("invalid_key:{error}")))?;
    Ok(asset_root.join(dir).join(format!("{key}.{extension}")))
}

fn load_atlas(asset_root: &Path, key: &str) -> Result<LoadedAtlas, LoadFailure> {
    let json_path = resolve_asset_path(asset_root, "atlas", key, "json")?;
    let frames = AtlasFrames::load(&json_path)
        .map_err(|error| (Some(json_path.clone()), format!("atlas_invalid:{error}")))?;
    let image_path = json_path.with_extension("png");
    let image = load_sprite_rgba(&image_path).map_err(|reason| (Some(image_path), reason))?;
    Ok(LoadedAtlas { image, frames })
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

fn draw_entity(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    entity: &Entity,
    assets: &mut AssetCaches<'_>,
) {
    match &entity.renderable.kind {
        RenderableKind::Placeholder => draw_placeholder(frame, width, height, rect),
        RenderableKind::Solid(color) => draw_filled_rect(frame, width, height, rect, *color),
        RenderableKind::Sprite(key) => match assets.sprite(key) {
            Some(sprite) => draw_image_region(
                frame,
                width,
                height,
                rect,
                sprite,
                full_region(sprite),
                entity.flip_x,
            ),
            None => draw_placeholder(frame, width, height, rect),
        },
        RenderableKind::AtlasFrame { atlas, frame: frame_name } => {
            let region = assets
                .atlas(atlas)
                .and_then(|loaded| loaded.frames.frame(frame_name).map(|region| (loaded, region)));
            match region {
                Some((loaded, region)) => draw_image_region(
                    frame,
                    width,
                    height,
                    rect,
                    &loaded.image,
                    region,
                    entity.flip_x,
                ),
                None => draw_placeholder(frame, width, height, rect),
            }
        }
        RenderableKind::Meter { fill, color } => {
            draw_filled_rect(frame, width, height, rect, METER_TRACK_COLOR);
            let fill = if fill.is_finite() { (*fill).clamp(0.0, 1.0) } else { 0.0 };
            let filled_width = (rect.width as f32 * fill).round() as i32;
            draw_filled_rect(
                frame,
                width,
                height,
                PxRect::new(rect.x, rect.y, filled_width, rect.height),
                *color,
            );
            draw_rect_outline(frame, width, height, rect, METER_BORDER_COLOR);
        }
    }
}

fn draw_placeholder(frame: &mut [u8], width: u32, height: u32, rect: PxRect) {
    draw_filled_rect(frame, width, height, rect, PLACEHOLDER_COLOR);
    draw_rect_outline(frame, width, height, rect, PLACEHOLDER_BORDER_COLOR);
}

fn draw_centered_label(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    label: &str,
    text_scale: i32,
) {
    let (center_x, center_y) = rect.center();
    let x = center_x - text_width_px(label, text_scale) / 2;
    let y = center_y - line_advance_px(text_scale) / 2 + text_scale;
    draw_text(frame, width, height, x, y, label, LABEL_COLOR, text_scale);
}

fn draw_vertical_gradient(frame: &mut [u8], width: u32, height: u32, rect: PxRect) {
    if rect.height <= 0 {
        return;
    }
    for row in 0..rect.height {
        let t = row as f32 / rect.height as f32;
        let color = lerp_color(SKY_TOP_COLOR, SKY_BOTTOM_COLOR, t);
        draw_filled_rect(
            frame,
            width,
            height,
            PxRect::new(rect.x, rect.y + row, rect.width, 1),
            color,
        );
    }
}

fn lerp_color(from: [u8; 4], to: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for channel in 0..4 {
        let value = from[channel] as f32 + (to[channel] as f32 - from[channel] as f32) * t;
        out[channel] = value.round() as u8;
    }
    out
}

fn full_region(sprite: &LoadedSprite) -> AtlasRect {
    AtlasRect {
        x: 0,
        y: 0,
        w: sprite.width,
        h: sprite.height,
    }
}

/// Nearest-neighbour blit of `region` stretched over `dest`. Fully
/// transparent source pixels are skipped.
fn draw_image_region(
    frame: &mut [u8],
    width: u32,
    height: u32,
    dest: PxRect,
    image: &LoadedSprite,
    region: AtlasRect,
    flip_x: bool,
) {
    if dest.width <= 0 || dest.height <= 0 || region.w == 0 || region.h == 0 {
        return;
    }
    if region.x.saturating_add(region.w) > image.width
        || region.y.saturating_add(region.h) > image.height
    {
        return;
    }
    let expected_rgba_len = image.width as usize * image.height as usize * 4;
    if image.rgba.len() < expected_rgba_len {
        return;
    }

    let draw_left = dest.x.max(0);
    let draw_top = dest.y.max(0);
    let draw_right = (dest.x + dest.width).min(width as i32);
    let draw_bottom = (dest.y + dest.height).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let scale_x = region.w as f32 / dest.width as f32;
    let scale_y = region.h as f32 / dest.height as f32;
    let frame_width = width as usize;
    let image_width = image.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = (out_y - dest.y) as f32;
        let src_y = ((dy * scale_y).floor() as u32).min(region.h - 1) + region.y;
        let src_row_offset = src_y as usize * image_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = (out_x - dest.x) as f32;
            let mut local_x = ((dx * scale_x).floor() as u32).min(region.w - 1);
            if flip_x {
                local_x = region.w - 1 - local_x;
            }
            let src_offset = src_row_offset + (region.x + local_x) as usize * 4;
            let alpha = image.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset..dst_offset + 3]
                .copy_from_slice(&image.rgba[src_offset..src_offset + 3]);
            frame[dst_offset + 3] = 255;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn two_pixel_sprite() -> LoadedSprite {
        LoadedSprite {
            width: 2,
            height: 1,
            rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
        }
    }

    fn pixel(frame: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * width as usize + x) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn renderer_type_is_non_generic() {
        let _ = std::mem::size_of::<Renderer>();
    }

    #[test]
    fn image_region_stretches_and_flips() {
        let sprite = two_pixel_sprite();
        let mut frame = vec![0u8; 4 * 4];
        draw_image_region(
            &mut frame,
            4,
            1,
            PxRect::new(0, 0, 4, 1),
            &sprite,
            full_region(&sprite),
            false,
        );
        assert_eq!(pixel(&frame, 4, 0, 0), [255, 0, 0, 255]);
        assert_eq!(pixel(&frame, 4, 3, 0), [0, 0, 255, 255]);

        draw_image_region(
            &mut frame,
            4,
            1,
            PxRect::new(0, 0, 4, 1),
            &sprite,
            full_region(&sprite),
            true,
        );
        assert_eq!(pixel(&frame, 4, 0, 0), [0, 0, 255, 255]);
        assert_eq!(pixel(&frame, 4, 3, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn out_of_range_region_draws_nothing() {
        let sprite = two_pixel_sprite();
        let mut frame = vec![0u8; 4 * 4];
        let region = AtlasRect {
            x: 1,
            y: 0,
            w: 2,
            h: 1,
        };
        draw_image_region(&mut frame, 4, 1, PxRect::new(0, 0, 4, 1), &sprite, region, false);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn gradient_runs_from_top_to_bottom_color() {
        let mut frame = vec![0u8; 2 * 10 * 4];
        draw_vertical_gradient(&mut frame, 2, 10, PxRect::new(0, 0, 2, 10));
        assert_eq!(pixel(&frame, 2, 0, 0), SKY_TOP_COLOR);
        assert_ne!(pixel(&frame, 2, 0, 9), SKY_TOP_COLOR);
    }

    #[test]
    fn missing_sprite_is_cached_and_warned_once() {
        let temp = TempDir::new().expect("temp");
        let mut sprite_cache = HashMap::new();
        let mut atlas_cache = HashMap::new();
        let mut warned = HashSet::new();
        let mut assets = AssetCaches {
            asset_root: Some(temp.path()),
            sprite_cache: &mut sprite_cache,
            atlas_cache: &mut atlas_cache,
            warned_missing_keys: &mut warned,
        };
        assert!(assets.sprite("missing").is_none());
        assert!(assets.sprite("missing").is_none());
        assert!(assets.atlas("player").is_none());
        assert_eq!(sprite_cache.len(), 1);
        assert_eq!(atlas_cache.len(), 1);
        assert_eq!(warned.len(), 2);
    }

    #[test]
    fn unresolved_asset_root_misses_without_warning() {
        let mut sprite_cache = HashMap::new();
        let mut atlas_cache = HashMap::new();
        let mut warned = HashSet::new();
        let mut assets = AssetCaches {
            asset_root: None,
            sprite_cache: &mut sprite_cache,
            atlas_cache: &mut atlas_cache,
            warned_missing_keys: &mut warned,
        };
        assert!(assets.sprite("background").is_none());
        assert!(assets.atlas("player").is_none());
        assert_eq!(sprite_cache.len(), 1);
        assert_eq!(atlas_cache.len(), 1);
        assert!(warned.is_empty());
    }

    #[test]
    fn sprite_loads_from_sprites_dir() {
        let temp = TempDir::new().expect("temp");
        let dir = temp.path().join("sprites");
        std::fs::create_dir_all(&dir).expect("sprites dir");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(dir.join("tile.png"))
            .expect("png");

        let mut sprite_cache = HashMap::new();
        let mut atlas_cache = HashMap::new();
        let mut warned = HashSet::new();
        let mut assets = AssetCaches {
            asset_root: Some(temp.path()),
            sprite_cache: &mut sprite_cache,
            atlas_cache: &mut atlas_cache,
            warned_missing_keys: &mut warned,
        };
        let sprite = assets.sprite("tile").expect("sprite");
        assert_eq!((sprite.width, sprite.height), (3, 2));
        assert!(warned.is_empty());
    }

    #[test]
    fn invalid_keys_never_touch_disk() {
        let temp = TempDir::new().expect("temp");
        let error = resolve_asset_path(temp.path(), "sprites", "../escape", "png")
            .expect_err("traversal rejected");
        assert!(error.0.is_none());
        assert!(error.1.starts_with("invalid_key:"));
    }
}
