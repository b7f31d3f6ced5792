use crate::app::{Rect, Vec2, STAGE_HEIGHT, STAGE_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn from_size(window_size: (u32, u32)) -> Self {
        Self {
            width: window_size.0,
            height: window_size.1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Uniform stage-to-window scale. The stage is letterboxed, never stretched.
    pub fn scale(&self) -> f32 {
        (self.width as f32 / STAGE_WIDTH).min(self.height as f32 / STAGE_HEIGHT)
    }

    fn offset(&self) -> (f32, f32) {
        let scale = self.scale();
        (
            (self.width as f32 - STAGE_WIDTH * scale) * 0.5,
            (self.height as f32 - STAGE_HEIGHT * scale) * 0.5,
        )
    }

    /// The window area the stage occupies.
    pub fn stage_rect(&self) -> PxRect {
        let scale = self.scale();
        let (offset_x, offset_y) = self.offset();
        PxRect::new(
            offset_x.round() as i32,
            offset_y.round() as i32,
            (STAGE_WIDTH * scale).round() as i32,
            (STAGE_HEIGHT * scale).round() as i32,
        )
    }
}

/// Window-space rectangle in pixels, y-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PxRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PxRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, point_px: Vec2) -> bool {
        point_px.x >= self.x as f32
            && point_px.y >= self.y as f32
            && point_px.x < (self.x + self.width) as f32
            && point_px.y < (self.y + self.height) as f32
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

pub fn world_to_screen_px(window_size: (u32, u32), world: Vec2) -> (i32, i32) {
    let viewport = Viewport::from_size(window_size);
    let scale = viewport.scale();
    let (offset_x, offset_y) = viewport.offset();
    let x = offset_x + world.x * scale;
    let y = offset_y + (STAGE_HEIGHT - world.y) * scale;
    (x.round() as i32, y.round() as i32)
}

/// Inverse of [`world_to_screen_px`]. `None` while the window has no area.
pub fn screen_to_world_px(window_size: (u32, u32), screen_px: Vec2) -> Option<Vec2> {
    let viewport = Viewport::from_size(window_size);
    if viewport.is_empty() {
        return None;
    }
    let scale = viewport.scale();
    let (offset_x, offset_y) = viewport.offset();
    Some(Vec2::new(
        (screen_px.x - offset_x) / scale,
        STAGE_HEIGHT - (screen_px.y - offset_y) / scale,
    ))
}

pub(crate) fn world_rect_to_screen(window_size: (u32, u32), rect: Rect) -> PxRect {
    let (left, top) = world_to_screen_px(window_size, Vec2::new(rect.min.x, rect.max.y));
    let (right, bottom) = world_to_screen_px(window_size, Vec2::new(rect.max.x, rect.min.y));
    PxRect::new(left, top, (right - left).max(0), (bottom - top).max(0))
}
