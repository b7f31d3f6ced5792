use tour_engine::{
    EntityId, InputSnapshot, RenderableDesc, RenderableKind, SceneCommand, SceneWorld, Transform,
    Vec2,
};
use tracing::{debug, info};

use super::actor::{ActorPhysics, GROUND_TOP};
use super::content::bridge_complete_overlay;
use super::progress::{ProgressAdvance, ProgressMeter};
use super::stage::{StageFrame, StageHud, CORNER_BUTTON_POSITION};

const STAGE_NAME: &str = "bridge";
pub(crate) const PLANK_COUNT: u32 = 10;
const PLANK_HALF_EXTENTS: Vec2 = Vec2::new(20.0, 6.0);
const PLANK_COLOR: [u8; 4] = [150, 104, 60, 255];
const METER_POSITION: Vec2 = Vec2::new(480.0, 440.0);
const METER_HALF_EXTENTS: Vec2 = Vec2::new(200.0, 10.0);
const METER_COLOR: [u8; 4] = [96, 196, 120, 255];

/// Repeated progress presses fill a meter and lay planks; the first press
/// that fills the meter shows the completion overlay.
#[derive(Debug, Clone)]
pub(crate) struct BridgeStage {
    pub(crate) frame: StageFrame,
    meter: ProgressMeter,
    completion_shown: bool,
    planks: Vec<EntityId>,
    meter_entity: Option<EntityId>,
}

impl BridgeStage {
    pub(crate) fn new(physics: ActorPhysics, progress_step: f32, progress_max: f32) -> Self {
        Self {
            frame: StageFrame::new(physics, "Next", CORNER_BUTTON_POSITION, SceneCommand::Advance),
            meter: ProgressMeter::new(progress_step, progress_max),
            completion_shown: false,
            planks: Vec::new(),
            meter_entity: None,
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld) {
        self.meter.reset();
        self.completion_shown = false;
        self.frame.enter(world);
        self.planks = (0..PLANK_COUNT)
            .map(|index| {
                let plank = world.spawn(
                    Transform {
                        position: Vec2::new(
                            280.0 + index as f32 * PLANK_HALF_EXTENTS.x * 2.0,
                            GROUND_TOP + PLANK_HALF_EXTENTS.y,
                        ),
                    },
                    PLANK_HALF_EXTENTS,
                    RenderableDesc {
                        kind: RenderableKind::Solid(PLANK_COLOR),
                        debug_name: "bridge.plank",
                    },
                );
                world.set_visible(plank, false);
                plank
            })
            .collect();
        self.meter_entity = Some(world.spawn(
            Transform {
                position: METER_POSITION,
            },
            METER_HALF_EXTENTS,
            RenderableDesc {
                kind: meter_kind(0.0),
                debug_name: "bridge.meter",
            },
        ));
    }

    pub(crate) fn handle_trigger(&mut self, input: &InputSnapshot, world: &mut SceneWorld) {
        if !input.progress_pressed() {
            return;
        }
        let advance = self.meter.press();
        if advance == ProgressAdvance::AlreadyFull {
            return;
        }
        self.sync_visuals(world);
        debug!(
            stage = STAGE_NAME,
            value_bp = self.meter.value_bp(),
            max_bp = self.meter.max_bp(),
            "bridge_progress"
        );
        if advance == ProgressAdvance::ReachedMax && !self.completion_shown {
            self.completion_shown = true;
            info!(stage = STAGE_NAME, "bridge_completed");
            self.frame.present(STAGE_NAME, world, bridge_complete_overlay());
        }
    }

    pub(crate) fn check_completion(&self) -> bool {
        self.meter.is_full() && self.completion_shown
    }

    pub(crate) fn exit(&mut self) {
        self.frame.exit();
        self.planks.clear();
        self.meter_entity = None;
    }

    #[cfg(test)]
    pub(crate) fn meter(&self) -> &ProgressMeter {
        &self.meter
    }

    pub(crate) fn hud(&self) -> StageHud {
        StageHud {
            instructions: "Press Space or B to lay the next plank.",
            progress: Some(format!("Bridge {}%", self.meter.percent())),
        }
    }

    fn sync_visuals(&self, world: &mut SceneWorld) {
        let laid = (u64::from(self.meter.value_bp()) * u64::from(PLANK_COUNT)
            / u64::from(self.meter.max_bp())) as usize;
        for (index, plank) in self.planks.iter().enumerate() {
            world.set_visible(*plank, index < laid);
        }
        if let Some(meter) = self.meter_entity {
            world.set_renderable_kind(meter, meter_kind(self.meter.fraction()));
        }
    }
}

fn meter_kind(fill: f32) -> RenderableKind {
    RenderableKind::Meter {
        fill,
        color: METER_COLOR,
    }
}
