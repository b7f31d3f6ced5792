mod input;
mod loop_runner;
mod metrics;
mod overlay;
mod rendering;
mod scene;
mod sequence;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use overlay::{
    modal_layout, ModalLayout, OverlayContent, OverlayPresenter, OverlayToken, PresentError,
};
pub use rendering::{
    screen_to_world_px, world_to_screen_px, wrap_text, PxRect, Renderer, Viewport,
};
pub use scene::{
    Entity, EntityId, InputSnapshot, Rect, RenderableDesc, RenderableKind, Scene, SceneCommand,
    SceneWorld, SessionContext, Transform, Vec2, STAGE_HEIGHT, STAGE_WIDTH,
};
pub use sequence::{SceneSequence, SequenceError, StageTransition, TickReport};
