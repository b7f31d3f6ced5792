use tour_engine::{
    EntityId, InputSnapshot, OverlayContent, OverlayToken, RenderableDesc, RenderableKind, Scene,
    SceneCommand, SceneWorld, Transform, Vec2,
};
use tracing::{debug, info, warn};

use super::actor::{spawn_ground, Actor, ActorPhysics};
use super::benefits::BenefitsStage;
use super::bridge::BridgeStage;
use super::build_steps::BuildStepsStage;
use super::conclusion::ConclusionStage;
use super::content::TOUR_TITLE;
use super::examples::ExamplesStage;
use super::session::SessionState;
use super::title::TitleStage;

pub(crate) const BUTTON_HALF_EXTENTS: Vec2 = Vec2::new(70.0, 22.0);
pub(crate) const CORNER_BUTTON_POSITION: Vec2 = Vec2::new(860.0, 480.0);
const BUTTON_COLOR: [u8; 4] = [46, 110, 180, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StagePhase {
    /// Triggers may fire.
    Active,
    /// Waiting for the overlay with this token to be dismissed.
    OverlayBlocked(OverlayToken),
    /// Completion predicate held; the advance control is visible.
    Complete,
}

/// What every stage shares: ground, actor, gated advance control and the
/// phase machine around overlays.
#[derive(Debug, Clone)]
pub(crate) struct StageFrame {
    physics: ActorPhysics,
    button_label: &'static str,
    button_position: Vec2,
    exit_command: SceneCommand,
    actor: Option<Actor>,
    advance_button: Option<EntityId>,
    phase: StagePhase,
}

impl StageFrame {
    pub(crate) fn new(
        physics: ActorPhysics,
        button_label: &'static str,
        button_position: Vec2,
        exit_command: SceneCommand,
    ) -> Self {
        Self {
            physics,
            button_label,
            button_position,
            exit_command,
            actor: None,
            advance_button: None,
            phase: StagePhase::Active,
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld) {
        spawn_ground(world);
        self.actor = Some(Actor::spawn(world, self.physics));
        let button = world.spawn_clickable(
            Transform {
                position: self.button_position,
            },
            BUTTON_HALF_EXTENTS,
            RenderableDesc {
                kind: RenderableKind::Solid(BUTTON_COLOR),
                debug_name: "advance_button",
            },
        );
        world.set_label(button, self.button_label);
        world.set_visible(button, false);
        self.advance_button = Some(button);
        self.phase = StagePhase::Active;
    }

    pub(crate) fn exit(&mut self) {
        self.actor = None;
        self.advance_button = None;
        self.phase = StagePhase::Active;
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> StagePhase {
        self.phase
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase == StagePhase::Active
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.phase == StagePhase::Complete
    }

    pub(crate) fn button_label(&self) -> &'static str {
        self.button_label
    }

    pub(crate) fn tick_actor(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) {
        if let Some(actor) = self.actor.as_mut() {
            actor.tick(fixed_dt_seconds, input, world);
        }
    }

    pub(crate) fn actor_touches(&self, world: &SceneWorld, zone: EntityId) -> bool {
        self.actor
            .as_ref()
            .is_some_and(|actor| world.overlapping(actor.id(), zone))
    }

    /// Shows `content` and blocks the stage until it is dismissed. On failure
    /// the stage stays `Active`.
    pub(crate) fn present(
        &mut self,
        stage: &'static str,
        world: &mut SceneWorld,
        content: OverlayContent,
    ) {
        if self.phase != StagePhase::Active {
            warn!(stage, phase = ?self.phase, "overlay_present_outside_active_phase");
            return;
        }
        match world.overlay_mut().present(content) {
            Ok(token) => self.phase = StagePhase::OverlayBlocked(token),
            Err(error) => warn!(stage, error = %error, "overlay_present_failed"),
        }
    }

    /// True when `token` is the overlay this stage was waiting on.
    pub(crate) fn take_dismissal(&mut self, token: OverlayToken) -> bool {
        if self.phase != StagePhase::OverlayBlocked(token) {
            return false;
        }
        self.phase = StagePhase::Active;
        true
    }

    pub(crate) fn unlock(&mut self, stage: &'static str, world: &mut SceneWorld) {
        if self.phase == StagePhase::Complete {
            return;
        }
        self.phase = StagePhase::Complete;
        if let Some(button) = self.advance_button {
            world.set_visible(button, true);
        }
        info!(stage, "advance_unlocked");
    }

    /// Enter or a click on the visible advance control, never while an
    /// overlay is open.
    pub(crate) fn exit_requested(
        &self,
        world: &SceneWorld,
        input: &InputSnapshot,
    ) -> Option<SceneCommand> {
        if self.phase != StagePhase::Complete || world.overlay().is_blocking() {
            return None;
        }
        let button = self.advance_button?;
        (input.confirm_pressed() || world.clicked(input, button)).then_some(self.exit_command)
    }
}

/// Text a stage contributes to the HUD and window title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StageHud {
    pub(crate) instructions: &'static str,
    pub(crate) progress: Option<String>,
}

/// One stage of the tour, dispatched by variant.
#[derive(Debug, Clone)]
pub(crate) enum Stage {
    Title(TitleStage),
    Benefits(BenefitsStage),
    Bridge(BridgeStage),
    BuildSteps(BuildStepsStage),
    Examples(ExamplesStage),
    Conclusion(ConclusionStage),
}

impl Stage {
    pub(crate) fn frame(&self) -> &StageFrame {
        match self {
            Stage::Title(stage) => &stage.frame,
            Stage::Benefits(stage) => &stage.frame,
            Stage::Bridge(stage) => &stage.frame,
            Stage::BuildSteps(stage) => &stage.frame,
            Stage::Examples(stage) => &stage.frame,
            Stage::Conclusion(stage) => &stage.frame,
        }
    }

    fn frame_mut(&mut self) -> &mut StageFrame {
        match self {
            Stage::Title(stage) => &mut stage.frame,
            Stage::Benefits(stage) => &mut stage.frame,
            Stage::Bridge(stage) => &mut stage.frame,
            Stage::BuildSteps(stage) => &mut stage.frame,
            Stage::Examples(stage) => &mut stage.frame,
            Stage::Conclusion(stage) => &mut stage.frame,
        }
    }

    fn enter(&mut self, world: &mut SceneWorld, session: &SessionState) {
        match self {
            Stage::Title(stage) => stage.enter(world),
            Stage::Benefits(stage) => stage.enter(world, session),
            Stage::Bridge(stage) => stage.enter(world),
            Stage::BuildSteps(stage) => stage.enter(world),
            Stage::Examples(stage) => stage.enter(world, session),
            Stage::Conclusion(stage) => stage.enter(world),
        }
    }

    fn handle_trigger(
        &mut self,
        input: &InputSnapshot,
        world: &mut SceneWorld,
        session: &mut SessionState,
    ) {
        match self {
            Stage::Title(_) | Stage::Conclusion(_) => {}
            Stage::Benefits(stage) => stage.handle_trigger(world, session),
            Stage::Bridge(stage) => stage.handle_trigger(input, world),
            Stage::BuildSteps(stage) => stage.handle_trigger(world),
            Stage::Examples(stage) => stage.handle_trigger(world, session),
        }
    }

    fn check_completion(&self, session: &SessionState) -> bool {
        match self {
            Stage::Title(_) | Stage::Conclusion(_) => true,
            Stage::Benefits(stage) => stage.check_completion(session),
            Stage::Bridge(stage) => stage.check_completion(),
            Stage::BuildSteps(stage) => stage.check_completion(),
            Stage::Examples(stage) => stage.check_completion(session),
        }
    }

    fn exit(&mut self) {
        match self {
            Stage::Title(stage) => stage.frame.exit(),
            Stage::Benefits(stage) => stage.exit(),
            Stage::Bridge(stage) => stage.exit(),
            Stage::BuildSteps(stage) => stage.exit(),
            Stage::Examples(stage) => stage.exit(),
            Stage::Conclusion(stage) => stage.frame.exit(),
        }
    }

    pub(crate) fn hud(&self, session: &SessionState) -> StageHud {
        match self {
            Stage::Title(_) => TitleStage::hud(),
            Stage::Benefits(_) => BenefitsStage::hud(session),
            Stage::Bridge(stage) => stage.hud(),
            Stage::BuildSteps(stage) => stage.hud(),
            Stage::Examples(_) => ExamplesStage::hud(session),
            Stage::Conclusion(_) => ConclusionStage::hud(),
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Stage::Title(_) => "Title",
            Stage::Benefits(_) => "Benefits",
            Stage::Bridge(_) => "Bridge",
            Stage::BuildSteps(_) => "Build steps",
            Stage::Examples(_) => "Examples",
            Stage::Conclusion(_) => "Conclusion",
        }
    }

    fn refresh_hud(&self, world: &mut SceneWorld, session: &SessionState) {
        let hud = self.hud(session);
        let mut lines = vec![hud.instructions.to_string()];
        lines.extend(hud.progress);
        let frame = self.frame();
        if frame.is_complete() {
            lines.push(format!("Press Enter or click {}.", frame.button_label()));
        }
        world.set_hud_lines(lines);
    }

    fn unlock_if_complete(&mut self, world: &mut SceneWorld, session: &SessionState) {
        if self.check_completion(session) {
            let name = self.debug_name();
            self.frame_mut().unlock(name, world);
        }
    }
}

impl Scene<SessionState> for Stage {
    fn load(&mut self, world: &mut SceneWorld, session: &mut SessionState) {
        debug!(
            stage = self.debug_name(),
            fresh_session = session.is_empty(),
            "stage_entering"
        );
        self.enter(world, session);
        self.unlock_if_complete(world, session);
        self.refresh_hud(world, session);
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
        session: &mut SessionState,
    ) -> SceneCommand {
        self.frame_mut().tick_actor(fixed_dt_seconds, input, world);
        if self.frame().is_active() {
            self.handle_trigger(input, world, session);
            // Still active after a trigger means no overlay went up.
            if self.frame().is_active() {
                self.unlock_if_complete(world, session);
            }
        }
        let command = self
            .frame()
            .exit_requested(world, input)
            .unwrap_or(SceneCommand::None);
        self.refresh_hud(world, session);
        command
    }

    fn overlay_dismissed(
        &mut self,
        token: OverlayToken,
        world: &mut SceneWorld,
        session: &mut SessionState,
    ) {
        if !self.frame_mut().take_dismissal(token) {
            warn!(stage = self.debug_name(), token = token.0, "overlay_dismissal_unexpected");
            return;
        }
        self.unlock_if_complete(world, session);
        self.refresh_hud(world, session);
    }

    fn unload(&mut self, _world: &mut SceneWorld, _session: &mut SessionState) {
        self.exit();
    }

    fn debug_name(&self) -> &'static str {
        match self {
            Stage::Title(_) => "title",
            Stage::Benefits(_) => "benefits",
            Stage::Bridge(_) => "bridge",
            Stage::BuildSteps(_) => "build_steps",
            Stage::Examples(_) => "examples",
            Stage::Conclusion(_) => "conclusion",
        }
    }

    fn debug_title(&self, _world: &SceneWorld, session: &SessionState) -> Option<String> {
        let detail = self
            .hud(session)
            .progress
            .unwrap_or_else(|| self.display_name().to_string());
        Some(format!("{TOUR_TITLE} | {detail}"))
    }
}
