use tour_engine::{
    EntityId, RenderableDesc, RenderableKind, SceneCommand, SceneWorld, Transform, Vec2,
};
use tracing::info;

use super::actor::{ActorPhysics, GROUND_TOP};
use super::content::{benefit_label, benefit_overlay};
use super::session::{BenefitKey, SessionState};
use super::stage::{StageFrame, StageHud, CORNER_BUTTON_POSITION};

const STAGE_NAME: &str = "benefits";
const ZONE_HALF_EXTENTS: Vec2 = Vec2::new(14.0, 14.0);
const ZONE_COLOR: [u8; 4] = [236, 196, 64, 255];
const LOW_ZONE_Y: f32 = GROUND_TOP + 40.0;
const HIGH_ZONE_Y: f32 = GROUND_TOP + 116.0;

pub(crate) fn zone_debug_name(key: BenefitKey) -> &'static str {
    match key {
        BenefitKey::Performance => "benefit.performance",
        BenefitKey::MemorySafety => "benefit.memory_safety",
        BenefitKey::Concurrency => "benefit.concurrency",
        BenefitKey::Ecosystem => "benefit.ecosystem",
        BenefitKey::Portability => "benefit.portability",
    }
}

/// Five collectibles; collecting all of them unlocks Next.
#[derive(Debug, Clone)]
pub(crate) struct BenefitsStage {
    pub(crate) frame: StageFrame,
    zones: Vec<(BenefitKey, EntityId)>,
}

impl BenefitsStage {
    pub(crate) fn new(physics: ActorPhysics) -> Self {
        Self {
            frame: StageFrame::new(physics, "Next", CORNER_BUTTON_POSITION, SceneCommand::Advance),
            zones: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld, session: &SessionState) {
        self.frame.enter(world);
        self.zones = BenefitKey::ALL
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let y = if index % 2 == 0 { LOW_ZONE_Y } else { HIGH_ZONE_Y };
                let zone = world.spawn(
                    Transform {
                        position: Vec2::new(220.0 + index as f32 * 140.0, y),
                    },
                    ZONE_HALF_EXTENTS,
                    RenderableDesc {
                        kind: RenderableKind::Solid(ZONE_COLOR),
                        debug_name: zone_debug_name(*key),
                    },
                );
                world.set_label(zone, benefit_label(*key));
                world.set_visible(zone, !session.is_benefit_collected(*key));
                (*key, zone)
            })
            .collect();
    }

    /// Collects the first uncollected benefit the actor is touching.
    pub(crate) fn handle_trigger(&mut self, world: &mut SceneWorld, session: &mut SessionState) {
        let touched = self.zones.iter().copied().find(|(key, zone)| {
            !session.is_benefit_collected(*key) && self.frame.actor_touches(world, *zone)
        });
        let Some((key, zone)) = touched else {
            return;
        };
        if !session.collect_benefit(key) {
            return;
        }
        world.set_visible(zone, false);
        info!(
            stage = STAGE_NAME,
            key = key.as_str(),
            collected = session.benefits_collected_count(),
            "benefit_collected"
        );
        self.frame.present(STAGE_NAME, world, benefit_overlay(key));
    }

    pub(crate) fn check_completion(&self, session: &SessionState) -> bool {
        session.all_benefits_collected()
    }

    pub(crate) fn exit(&mut self) {
        self.frame.exit();
        self.zones.clear();
    }

    pub(crate) fn hud(session: &SessionState) -> StageHud {
        StageHud {
            instructions: "Walk and jump into every benefit.",
            progress: Some(format!(
                "Benefits {}/{}",
                session.benefits_collected_count(),
                BenefitKey::ALL.len()
            )),
        }
    }
}
