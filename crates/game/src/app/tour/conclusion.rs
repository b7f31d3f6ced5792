use tour_engine::{SceneCommand, SceneWorld, Vec2, STAGE_HEIGHT, STAGE_WIDTH};

use super::actor::ActorPhysics;
use super::content::CONCLUSION_SUMMARY;
use super::stage::{StageFrame, StageHud};

/// Final stage. Its control restarts the whole tour.
#[derive(Debug, Clone)]
pub(crate) struct ConclusionStage {
    pub(crate) frame: StageFrame,
}

impl ConclusionStage {
    pub(crate) fn new(physics: ActorPhysics) -> Self {
        Self {
            frame: StageFrame::new(
                physics,
                "Replay",
                Vec2::new(STAGE_WIDTH * 0.5, STAGE_HEIGHT * 0.5),
                SceneCommand::Replay,
            ),
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld) {
        self.frame.enter(world);
    }

    pub(crate) fn hud() -> StageHud {
        StageHud {
            instructions: CONCLUSION_SUMMARY,
            progress: None,
        }
    }
}
