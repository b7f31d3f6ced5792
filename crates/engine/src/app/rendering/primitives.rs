use super::PxRect;

pub(crate) fn write_pixel_rgba(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let Some(pixel_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
    else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    frame[byte_offset..end].copy_from_slice(&color);
}

/// Alpha-blends `color` over the existing pixel. The frame stays opaque.
pub(crate) fn blend_pixel_rgba(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
        return;
    }
    let byte_offset = (y as usize * width + x as usize) * 4;
    let Some(pixel) = frame.get_mut(byte_offset..byte_offset + 4) else {
        return;
    };
    let alpha = u16::from(color[3]);
    let inverse = 255 - alpha;
    for channel in 0..3 {
        let blended =
            (u16::from(color[channel]) * alpha + u16::from(pixel[channel]) * inverse) / 255;
        pixel[channel] = blended as u8;
    }
    pixel[3] = 255;
}

fn clip(rect: PxRect, width: u32, height: u32) -> Option<(i32, i32, i32, i32)> {
    let start_x = rect.x.max(0);
    let start_y = rect.y.max(0);
    let end_x = rect.x.saturating_add(rect.width).min(width as i32);
    let end_y = rect.y.saturating_add(rect.height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return None;
    }
    Some((start_x, start_y, end_x, end_y))
}

pub(crate) fn draw_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    color: [u8; 4],
) {
    let Some((start_x, start_y, end_x, end_y)) = clip(rect, width, height) else {
        return;
    };
    let width_usize = width as usize;
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba(frame, width_usize, px, py, color);
        }
    }
}

pub(crate) fn blend_filled_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    color: [u8; 4],
) {
    let Some((start_x, start_y, end_x, end_y)) = clip(rect, width, height) else {
        return;
    };
    let width_usize = width as usize;
    for py in start_y..end_y {
        for px in start_x..end_x {
            blend_pixel_rgba(frame, width_usize, px, py, color);
        }
    }
}

pub(crate) fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    height: u32,
    rect: PxRect,
    color: [u8; 4],
) {
    if rect.width <= 1 || rect.height <= 1 {
        return;
    }
    let PxRect {
        x,
        y,
        width: rect_width,
        height: rect_height,
    } = rect;
    draw_filled_rect(frame, width, height, PxRect::new(x, y, rect_width, 1), color);
    draw_filled_rect(
        frame,
        width,
        height,
        PxRect::new(x, y + rect_height - 1, rect_width, 1),
        color,
    );
    draw_filled_rect(frame, width, height, PxRect::new(x, y, 1, rect_height), color);
    draw_filled_rect(
        frame,
        width,
        height,
        PxRect::new(x + rect_width - 1, y, 1, rect_height),
        color,
    );
}
