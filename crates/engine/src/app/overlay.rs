use thiserror::Error;
use tracing::info;

use super::rendering::{
    glyph_advance_px, line_advance_px, text_width_px, wrap_text, PxRect, Viewport,
};

const PANEL_FRACTION: f32 = 0.8;
const BASE_TEXT_SCALE: f32 = 2.0;
const DISMISS_LABEL: &str = "OK";

/// What an overlay shows: a title, explanatory text, and optionally a code
/// snippet and the output it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayContent {
    pub title: String,
    pub body: String,
    pub code: Option<String>,
    pub output: Option<String>,
}

impl OverlayContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            code: None,
            output: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Identifies one presentation. Tokens are never reused by a presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PresentError {
    #[error("overlay {active:?} is still open")]
    AlreadyActive { active: OverlayToken },
}

/// Single-slot modal presenter. While an overlay is active the stage behind
/// it receives no clicks or presses.
#[derive(Debug, Default)]
pub struct OverlayPresenter {
    active: Option<(OverlayToken, OverlayContent)>,
    last_token: u64,
}

impl OverlayPresenter {
    pub fn present(&mut self, content: OverlayContent) -> Result<OverlayToken, PresentError> {
        if let Some((active, _)) = &self.active {
            return Err(PresentError::AlreadyActive { active: *active });
        }
        self.last_token = self.last_token.saturating_add(1);
        let token = OverlayToken(self.last_token);
        info!(token = token.0, title = %content.title, "overlay_presented");
        self.active = Some((token, content));
        Ok(token)
    }

    /// Closes the active overlay. Returns its token the first time only.
    pub fn dismiss(&mut self) -> Option<OverlayToken> {
        let (token, content) = self.active.take()?;
        info!(token = token.0, title = %content.title, "overlay_dismissed");
        Some(token)
    }

    pub fn is_blocking(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_token(&self) -> Option<OverlayToken> {
        self.active.as_ref().map(|(token, _)| *token)
    }

    pub fn active_content(&self) -> Option<&OverlayContent> {
        self.active.as_ref().map(|(_, content)| content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalLayout {
    pub panel: PxRect,
    pub dismiss_button: PxRect,
    pub text_x: i32,
    pub text_y: i32,
    pub text_columns: usize,
    pub text_rows: usize,
    pub text_scale: i32,
}

/// Window-space layout of the modal panel. Drawing and click hit-testing
/// both use this so the button is clickable exactly where it is drawn.
pub fn modal_layout(window_size: (u32, u32)) -> ModalLayout {
    let viewport = Viewport::from_size(window_size);
    let stage = viewport.stage_rect();
    let text_scale = ((BASE_TEXT_SCALE * viewport.scale()).round() as i32).max(1);
    let padding = 6 * text_scale;

    let panel_width = (stage.width as f32 * PANEL_FRACTION).round() as i32;
    let panel_height = (stage.height as f32 * PANEL_FRACTION).round() as i32;
    let panel = PxRect::new(
        stage.x + (stage.width - panel_width) / 2,
        stage.y + (stage.height - panel_height) / 2,
        panel_width,
        panel_height,
    );

    let button_width = text_width_px(DISMISS_LABEL, text_scale) + 4 * padding;
    let button_height = line_advance_px(text_scale) + padding;
    let dismiss_button = PxRect::new(
        panel.x + (panel.width - button_width) / 2,
        panel.y + panel.height - padding - button_height,
        button_width,
        button_height,
    );

    let text_x = panel.x + padding;
    let text_y = panel.y + padding;
    let text_columns = ((panel.width - 2 * padding) / glyph_advance_px(text_scale)).max(1) as usize;
    let text_rows =
        ((dismiss_button.y - padding - text_y) / line_advance_px(text_scale)).max(0) as usize;

    ModalLayout {
        panel,
        dismiss_button,
        text_x,
        text_y,
        text_columns,
        text_rows,
        text_scale,
    }
}

pub(crate) fn dismiss_label() -> &'static str {
    DISMISS_LABEL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModalLineKind {
    Title,
    Body,
    Heading,
    Code,
    Output,
}

/// Flattens overlay content into wrapped, styled lines.
pub(crate) fn modal_lines(
    content: &OverlayContent,
    columns: usize,
) -> Vec<(ModalLineKind, String)> {
    fn push_wrapped(
        lines: &mut Vec<(ModalLineKind, String)>,
        kind: ModalLineKind,
        text: &str,
        columns: usize,
    ) {
        lines.extend(wrap_text(text, columns).into_iter().map(|line| (kind, line)));
    }

    let mut lines = Vec::new();
    push_wrapped(&mut lines, ModalLineKind::Title, &content.title, columns);
    lines.push((ModalLineKind::Body, String::new()));
    push_wrapped(&mut lines, ModalLineKind::Body, &content.body, columns);

    if let Some(code) = &content.code {
        lines.push((ModalLineKind::Body, String::new()));
        lines.push((ModalLineKind::Heading, "Code:".to_string()));
        push_wrapped(&mut lines, ModalLineKind::Code, code, columns);
    }
    if let Some(output) = &content.output {
        lines.push((ModalLineKind::Body, String::new()));
        lines.push((ModalLineKind::Heading, "Output:".to_string()));
        push_wrapped(&mut lines, ModalLineKind::Output, output, columns);
    }
    lines
}
