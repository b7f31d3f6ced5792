use tour_engine::{
    AnimationPlayer, EntityId, InputAction, InputSnapshot, RenderableDesc, RenderableKind,
    SceneWorld, Transform, Vec2, STAGE_WIDTH,
};

use crate::app::settings::TourSettings;

/// Top edge of the ground strip every stage stands on.
pub(crate) const GROUND_TOP: f32 = 64.0;
pub(crate) const ACTOR_HALF_EXTENTS: Vec2 = Vec2::new(16.0, 24.0);
pub(crate) const ACTOR_START_X: f32 = 80.0;
const GROUND_COLOR: [u8; 4] = [72, 58, 44, 255];

pub(crate) const CLIP_IDLE: &str = "idle";
pub(crate) const CLIP_WALK: &str = "walk";
pub(crate) const CLIP_JUMP: &str = "jump";
pub(crate) const CLIP_FALL: &str = "fall";

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ActorPhysics {
    pub(crate) move_speed: f32,
    pub(crate) jump_velocity: f32,
    pub(crate) gravity: f32,
}

impl ActorPhysics {
    pub(crate) fn from_settings(settings: &TourSettings) -> Self {
        Self {
            move_speed: settings.move_speed,
            jump_velocity: settings.jump_velocity,
            gravity: settings.gravity,
        }
    }
}

pub(crate) fn spawn_ground(world: &mut SceneWorld) -> EntityId {
    world.spawn(
        Transform {
            position: Vec2::new(STAGE_WIDTH * 0.5, GROUND_TOP * 0.5),
        },
        Vec2::new(STAGE_WIDTH * 0.5, GROUND_TOP * 0.5),
        RenderableDesc {
            kind: RenderableKind::Solid(GROUND_COLOR),
            debug_name: "ground",
        },
    )
}

pub(crate) fn actor_start_position() -> Vec2 {
    Vec2::new(ACTOR_START_X, GROUND_TOP + ACTOR_HALF_EXTENTS.y)
}

/// The player character: a platformer body plus the animation cursor that
/// picks its atlas frame.
#[derive(Debug, Clone)]
pub(crate) struct Actor {
    id: EntityId,
    physics: ActorPhysics,
    velocity: Vec2,
    on_ground: bool,
    facing_left: bool,
    animation: AnimationPlayer,
}

impl Actor {
    pub(crate) fn spawn(world: &mut SceneWorld, physics: ActorPhysics) -> Self {
        let id = world.spawn(
            Transform {
                position: actor_start_position(),
            },
            ACTOR_HALF_EXTENTS,
            RenderableDesc {
                kind: RenderableKind::Placeholder,
                debug_name: "actor",
            },
        );
        let mut animation = AnimationPlayer::default();
        animation.play(CLIP_IDLE);
        Self {
            id,
            physics,
            velocity: Vec2::new(0.0, 0.0),
            on_ground: true,
            facing_left: false,
            animation,
        }
    }

    pub(crate) fn id(&self) -> EntityId {
        self.id
    }

    #[cfg(test)]
    pub(crate) fn current_clip(&self) -> Option<&str> {
        self.animation.current_clip()
    }

    /// One fixed step of movement, gravity and animation.
    pub(crate) fn tick(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) {
        let direction = axis(input);
        {
            let Some(entity) = world.find_entity_mut(self.id) else {
                return;
            };

            self.velocity.x = direction * self.physics.move_speed;
            if self.on_ground && input.is_down(InputAction::Jump) {
                self.velocity.y = self.physics.jump_velocity;
                self.on_ground = false;
            }
            self.velocity.y += self.physics.gravity * fixed_dt_seconds;

            let half = entity.half_extents;
            let mut position = entity.transform.position;
            position.x += self.velocity.x * fixed_dt_seconds;
            position.y += self.velocity.y * fixed_dt_seconds;

            if position.y - half.y <= GROUND_TOP {
                position.y = GROUND_TOP + half.y;
                self.velocity.y = 0.0;
                self.on_ground = true;
            } else {
                self.on_ground = false;
            }
            position.x = position.x.clamp(half.x, STAGE_WIDTH - half.x);

            if direction < 0.0 {
                self.facing_left = true;
            } else if direction > 0.0 {
                self.facing_left = false;
            }

            entity.transform.position = position;
            entity.flip_x = self.facing_left;
        }

        self.animation.play(self.pick_clip(direction));
        self.animation.advance(fixed_dt_seconds);
        let kind = world
            .animation_library()
            .and_then(|library| self.animation.current_frame(library))
            .map(|frame| RenderableKind::AtlasFrame {
                atlas: frame.atlas.clone(),
                frame: frame.frame.clone(),
            })
            .unwrap_or(RenderableKind::Placeholder);
        world.set_renderable_kind(self.id, kind);
    }

    fn pick_clip(&self, direction: f32) -> &'static str {
        if !self.on_ground {
            if self.velocity.y > 0.0 {
                CLIP_JUMP
            } else {
                CLIP_FALL
            }
        } else if direction != 0.0 {
            CLIP_WALK
        } else {
            CLIP_IDLE
        }
    }
}

fn axis(input: &InputSnapshot) -> f32 {
    let mut direction = 0.0;
    if input.is_down(InputAction::MoveLeft) {
        direction -= 1.0;
    }
    if input.is_down(InputAction::MoveRight) {
        direction += 1.0;
    }
    direction
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tour_engine::{AnimationClip, AnimationLibrary, FrameRef};

    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn spawned() -> (SceneWorld, Actor) {
        let mut world = SceneWorld::default();
        let actor = Actor::spawn(&mut world, ActorPhysics::from_settings(&TourSettings::default()));
        world.apply_pending();
        (world, actor)
    }

    fn position(world: &SceneWorld, actor: &Actor) -> Vec2 {
        world
            .find_entity(actor.id())
            .expect("actor entity")
            .transform
            .position
    }

    #[test]
    fn actor_rests_on_ground_without_input() {
        let (mut world, mut actor) = spawned();
        for _ in 0..30 {
            actor.tick(DT, &InputSnapshot::empty(), &mut world);
        }
        assert_eq!(position(&world, &actor), actor_start_position());
        assert_eq!(actor.current_clip(), Some(CLIP_IDLE));
    }

    #[test]
    fn moving_left_flips_and_stops_at_stage_edge() {
        let (mut world, mut actor) = spawned();
        let input = InputSnapshot::empty().with_action_down(InputAction::MoveLeft, true);
        for _ in 0..120 {
            actor.tick(DT, &input, &mut world);
        }
        let entity = world.find_entity(actor.id()).expect("actor");
        assert_eq!(entity.transform.position.x, ACTOR_HALF_EXTENTS.x);
        assert!(entity.flip_x);
        assert_eq!(actor.current_clip(), Some(CLIP_WALK));
    }

    #[test]
    fn jump_rises_then_falls_back_to_ground() {
        let (mut world, mut actor) = spawned();
        let jump = InputSnapshot::empty().with_action_down(InputAction::Jump, true);
        actor.tick(DT, &jump, &mut world);
        assert!(position(&world, &actor).y > actor_start_position().y);
        assert_eq!(actor.current_clip(), Some(CLIP_JUMP));

        let mut saw_fall = false;
        for _ in 0..120 {
            actor.tick(DT, &InputSnapshot::empty(), &mut world);
            saw_fall |= actor.current_clip() == Some(CLIP_FALL);
        }
        assert!(saw_fall);
        assert_eq!(position(&world, &actor).y, actor_start_position().y);
        assert_eq!(actor.current_clip(), Some(CLIP_IDLE));
    }

    #[test]
    fn library_clip_sets_atlas_frame_renderable() {
        let (mut world, mut actor) = spawned();
        world.set_animation_library(Arc::new(AnimationLibrary::from_clips([AnimationClip {
            key: CLIP_IDLE.to_string(),
            frames: vec![FrameRef {
                atlas: "player".to_string(),
                frame: "idle_0".to_string(),
            }],
            frame_rate: 10.0,
            repeat: -1,
        }])));
        actor.tick(DT, &InputSnapshot::empty(), &mut world);
        assert_eq!(
            world.find_entity(actor.id()).expect("actor").renderable.kind,
            RenderableKind::AtlasFrame {
                atlas: "player".to_string(),
                frame: "idle_0".to_string(),
            }
        );

        let walk = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        actor.tick(DT, &walk, &mut world);
        assert_eq!(
            world.find_entity(actor.id()).expect("actor").renderable.kind,
            RenderableKind::Placeholder
        );
    }
}
