use crate::app::overlay::{dismiss_label, modal_layout, modal_lines, ModalLineKind};
use crate::app::OverlayContent;

use super::primitives::{blend_filled_rect, draw_filled_rect, draw_rect_outline};
use super::text::{draw_text, line_advance_px, text_width_px};
use super::PxRect;

const SCRIM_COLOR: [u8; 4] = [6, 8, 12, 170];
const PANEL_BG_COLOR: [u8; 4] = [18, 22, 30, 255];
const PANEL_BORDER_COLOR: [u8; 4] = [222, 165, 132, 255];
const TITLE_COLOR: [u8; 4] = [255, 214, 150, 255];
const BODY_COLOR: [u8; 4] = [232, 236, 242, 255];
const HEADING_COLOR: [u8; 4] = [150, 170, 196, 255];
const CODE_COLOR: [u8; 4] = [160, 220, 255, 255];
const OUTPUT_COLOR: [u8; 4] = [150, 236, 160, 255];
const BUTTON_BG_COLOR: [u8; 4] = [206, 92, 42, 255];
const BUTTON_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const OVERFLOW_MARKER: &str = "...";

fn line_color(kind: ModalLineKind) -> [u8; 4] {
    match kind {
        ModalLineKind::Title => TITLE_COLOR,
        ModalLineKind::Body => BODY_COLOR,
        ModalLineKind::Heading => HEADING_COLOR,
        ModalLineKind::Code => CODE_COLOR,
        ModalLineKind::Output => OUTPUT_COLOR,
    }
}

pub(crate) fn draw_modal(frame: &mut [u8], width: u32, height: u32, content: &OverlayContent) {
    if width == 0 || height == 0 {
        return;
    }
    let layout = modal_layout((width, height));

    blend_filled_rect(
        frame,
        width,
        height,
        PxRect::new(0, 0, width as i32, height as i32),
        SCRIM_COLOR,
    );
    draw_filled_rect(frame, width, height, layout.panel, PANEL_BG_COLOR);
    draw_rect_outline(frame, width, height, layout.panel, PANEL_BORDER_COLOR);

    let lines = modal_lines(content, layout.text_columns);
    let overflows = lines.len() > layout.text_rows;
    let visible_rows = if overflows {
        layout.text_rows.saturating_sub(1)
    } else {
        lines.len()
    };

    let line_advance = line_advance_px(layout.text_scale);
    let mut y = layout.text_y;
    for (kind, text) in lines.iter().take(visible_rows) {
        draw_text(
            frame,
            width,
            height,
            layout.text_x,
            y,
            text,
            line_color(*kind),
            layout.text_scale,
        );
        y += line_advance;
    }
    if overflows && layout.text_rows > 0 {
        draw_text(
            frame,
            width,
            height,
            layout.text_x,
            y,
            OVERFLOW_MARKER,
            HEADING_COLOR,
            layout.text_scale,
        );
    }

    let button = layout.dismiss_button;
    draw_filled_rect(frame, width, height, button, BUTTON_BG_COLOR);
    let label = dismiss_label();
    let (center_x, center_y) = button.center();
    draw_text(
        frame,
        width,
        height,
        center_x - text_width_px(label, layout.text_scale) / 2,
        center_y - line_advance / 2 + layout.text_scale,
        label,
        BUTTON_TEXT_COLOR,
        layout.text_scale,
    );
}
