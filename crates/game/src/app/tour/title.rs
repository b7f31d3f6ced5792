use tour_engine::{SceneCommand, SceneWorld, Vec2, STAGE_HEIGHT, STAGE_WIDTH};

use super::actor::ActorPhysics;
use super::content::TITLE_TAGLINE;
use super::stage::{StageFrame, StageHud};

#[derive(Debug, Clone)]
pub(crate) struct TitleStage {
    pub(crate) frame: StageFrame,
}

impl TitleStage {
    pub(crate) fn new(physics: ActorPhysics) -> Self {
        Self {
            frame: StageFrame::new(
                physics,
                "Start",
                Vec2::new(STAGE_WIDTH * 0.5, STAGE_HEIGHT * 0.5),
                SceneCommand::Advance,
            ),
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld) {
        self.frame.enter(world);
    }

    pub(crate) fn hud() -> StageHud {
        StageHud {
            instructions: TITLE_TAGLINE,
            progress: None,
        }
    }
}
