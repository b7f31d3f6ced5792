use tour_engine::{
    EntityId, RenderableDesc, RenderableKind, SceneCommand, SceneWorld, Transform, Vec2,
};
use tracing::info;

use super::actor::{ActorPhysics, GROUND_TOP};
use super::content::{build_step_overlay, BUILD_STEP_COUNT};
use super::stage::{StageFrame, StageHud, CORNER_BUTTON_POSITION};

const STAGE_NAME: &str = "build_steps";
const SIGNPOST_HALF_EXTENTS: Vec2 = Vec2::new(12.0, 30.0);
const SIGNPOST_PENDING_COLOR: [u8; 4] = [120, 120, 132, 255];
const SIGNPOST_DONE_COLOR: [u8; 4] = [88, 180, 104, 255];

pub(crate) const SIGNPOST_NAMES: [&str; BUILD_STEP_COUNT] = [
    "signpost.0",
    "signpost.1",
    "signpost.2",
    "signpost.3",
    "signpost.4",
    "signpost.5",
];

/// Signposts that only fire in order. Touching any signpost other than the
/// next one does nothing.
#[derive(Debug, Clone)]
pub(crate) struct BuildStepsStage {
    pub(crate) frame: StageFrame,
    next_step: usize,
    signposts: Vec<EntityId>,
}

impl BuildStepsStage {
    pub(crate) fn new(physics: ActorPhysics) -> Self {
        Self {
            frame: StageFrame::new(physics, "Next", CORNER_BUTTON_POSITION, SceneCommand::Advance),
            next_step: 0,
            signposts: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld) {
        self.next_step = 0;
        self.frame.enter(world);
        self.signposts = SIGNPOST_NAMES
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let signpost = world.spawn(
                    Transform {
                        position: Vec2::new(
                            180.0 + index as f32 * 120.0,
                            GROUND_TOP + SIGNPOST_HALF_EXTENTS.y,
                        ),
                    },
                    SIGNPOST_HALF_EXTENTS,
                    RenderableDesc {
                        kind: RenderableKind::Solid(SIGNPOST_PENDING_COLOR),
                        debug_name: name,
                    },
                );
                world.set_label(signpost, (index + 1).to_string());
                signpost
            })
            .collect();
    }

    pub(crate) fn handle_trigger(&mut self, world: &mut SceneWorld) {
        let Some(signpost) = self.signposts.get(self.next_step).copied() else {
            return;
        };
        if !self.frame.actor_touches(world, signpost) {
            return;
        }
        let Some(content) = build_step_overlay(self.next_step) else {
            return;
        };
        let step = self.next_step;
        self.next_step += 1;
        world.set_renderable_kind(signpost, RenderableKind::Solid(SIGNPOST_DONE_COLOR));
        info!(stage = STAGE_NAME, step, "build_step_completed");
        self.frame.present(STAGE_NAME, world, content);
    }

    pub(crate) fn check_completion(&self) -> bool {
        self.next_step == BUILD_STEP_COUNT
    }

    pub(crate) fn exit(&mut self) {
        self.frame.exit();
        self.signposts.clear();
    }

    #[cfg(test)]
    pub(crate) fn next_step(&self) -> usize {
        self.next_step
    }

    pub(crate) fn hud(&self) -> StageHud {
        StageHud {
            instructions: "Visit the signposts in order.",
            progress: Some(format!("Step {}/{}", self.next_step, BUILD_STEP_COUNT)),
        }
    }
}
