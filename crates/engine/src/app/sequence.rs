use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use super::overlay::{modal_layout, OverlayToken};
use super::scene::{InputSnapshot, Scene, SceneCommand, SceneWorld, SessionContext};
use crate::content::AnimationLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("scene sequence needs at least one stage")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTransition {
    pub from: usize,
    pub to: usize,
    pub replay: bool,
}

/// What happened during one [`SceneSequence::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub dismissed: Option<OverlayToken>,
    pub transition: Option<StageTransition>,
}

struct SceneRuntime<S> {
    scene: S,
    world: SceneWorld,
    is_loaded: bool,
}

/// Ordered, forward-only run of stages sharing one session context.
///
/// Exactly one stage is active. Advancing unloads it and loads the next one
/// from scratch; replaying resets the context and starts over at stage 0.
pub struct SceneSequence<S, C> {
    stages: Vec<SceneRuntime<S>>,
    active: usize,
    context: C,
}

impl<S: Scene<C>, C: SessionContext> SceneSequence<S, C> {
    pub fn new(stages: Vec<S>, context: C) -> Result<Self, SequenceError> {
        if stages.is_empty() {
            return Err(SequenceError::Empty);
        }
        Ok(Self {
            stages: stages
                .into_iter()
                .map(|scene| SceneRuntime {
                    scene,
                    world: SceneWorld::default(),
                    is_loaded: false,
                })
                .collect(),
            active: 0,
            context,
        })
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_last_stage(&self) -> bool {
        self.active + 1 == self.stages.len()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn active_scene(&self) -> &S {
        &self.stages[self.active].scene
    }

    pub fn active_world(&self) -> &SceneWorld {
        &self.stages[self.active].world
    }

    pub fn active_world_mut(&mut self) -> &mut SceneWorld {
        &mut self.stages[self.active].world
    }

    pub fn active_debug_name(&self) -> &'static str {
        self.stages[self.active].scene.debug_name()
    }

    pub fn debug_title_active(&self) -> Option<String> {
        let runtime = &self.stages[self.active];
        runtime.scene.debug_title(&runtime.world, &self.context)
    }

    pub fn set_animation_library_for_all(&mut self, library: Arc<AnimationLibrary>) {
        for runtime in &mut self.stages {
            runtime.world.set_animation_library(Arc::clone(&library));
        }
    }

    pub fn load_active(&mut self) {
        let index = self.active;
        let runtime = &mut self.stages[index];
        if runtime.is_loaded {
            return;
        }
        runtime.world.clear();
        runtime.scene.load(&mut runtime.world, &mut self.context);
        runtime.world.apply_pending();
        runtime.is_loaded = true;
        info!(
            index,
            stage = runtime.scene.debug_name(),
            entity_count = runtime.world.entity_count(),
            "stage_loaded"
        );
    }

    /// Runs one fixed step of the active stage.
    ///
    /// An open overlay swallows clicks and presses: Enter, or a click on its
    /// dismiss button, closes it and hands the token back to the stage. The
    /// stage still updates every tick, with masked input while blocked.
    pub fn tick(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> TickReport {
        self.load_active();
        let mut report = TickReport::default();

        let runtime = &mut self.stages[self.active];
        let context = &mut self.context;
        let mut stage_input = *input;
        if runtime.world.overlay().is_blocking() {
            if dismiss_requested(input) {
                if let Some(token) = runtime.world.overlay_mut().dismiss() {
                    runtime
                        .scene
                        .overlay_dismissed(token, &mut runtime.world, context);
                    report.dismissed = Some(token);
                }
            }
            stage_input = input.modal_masked();
        }

        let command = runtime
            .scene
            .update(fixed_dt_seconds, &stage_input, &mut runtime.world, context);
        runtime.world.apply_pending();

        report.transition = match command {
            SceneCommand::None => None,
            SceneCommand::Advance => self.advance(),
            SceneCommand::Replay => Some(self.replay()),
        };
        report
    }

    /// Moves to the next stage. A no-op on the last stage.
    ///
    /// This does not consult the active stage's completion gate; the window
    /// loop only advances when a stage returns [`SceneCommand::Advance`] from
    /// `tick`. Drivers call it directly to jump between stages, for example
    /// headless tests that start mid-tour.
    pub fn advance(&mut self) -> Option<StageTransition> {
        let from = self.active;
        if from + 1 >= self.stages.len() {
            debug!(index = from, "advance_ignored_on_last_stage");
            return None;
        }
        self.unload_active();
        self.active = from + 1;
        info!(
            from,
            to = self.active,
            stage = self.active_debug_name(),
            "stage_advanced"
        );
        self.load_active();
        Some(StageTransition {
            from,
            to: self.active,
            replay: false,
        })
    }

    /// Clears the session and restarts at the first stage.
    pub fn replay(&mut self) -> StageTransition {
        let from = self.active;
        self.unload_active();
        self.context.reset();
        self.active = 0;
        info!(from, "session_reset");
        self.load_active();
        StageTransition {
            from,
            to: 0,
            replay: true,
        }
    }

    pub fn shutdown_all(&mut self) {
        for runtime in &mut self.stages {
            if runtime.is_loaded {
                runtime.scene.unload(&mut runtime.world, &mut self.context);
                runtime.world.clear();
                runtime.is_loaded = false;
            }
        }
    }

    fn unload_active(&mut self) {
        let runtime = &mut self.stages[self.active];
        if runtime.is_loaded {
            runtime.scene.unload(&mut runtime.world, &mut self.context);
        }
        runtime.world.clear();
        runtime.is_loaded = false;
    }
}

fn dismiss_requested(input: &InputSnapshot) -> bool {
    if input.confirm_pressed() {
        return true;
    }
    if !input.left_click_pressed() {
        return false;
    }
    input.cursor_position_px().is_some_and(|cursor| {
        modal_layout(input.window_size())
            .dismiss_button
            .contains(cursor)
    })
}
