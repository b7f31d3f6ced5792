mod modal;
mod primitives;
mod renderer;
mod text;
mod transform;

pub use renderer::Renderer;
pub use text::wrap_text;
pub use transform::{screen_to_world_px, world_to_screen_px, PxRect, Viewport};

pub(crate) use text::{glyph_advance_px, line_advance_px, text_width_px};
